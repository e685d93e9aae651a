//! Component signals and their conjunction into entry decisions.
//!
//! Each signal family implements `ComponentSignal` with a uniform
//! evaluate-to-bool contract; the combiner owns one instance per family and
//! ANDs the required components. Adding a family is additive: implement the
//! trait, give it a weight, wire it into the combiner.
//!
//! Signals never see the portfolio. They receive policy-filtered snapshots
//! only, so the live/backtest distinction is invisible here by design.

pub mod breakout;
pub mod combiner;
pub mod earnings;
pub mod fundamental;
pub mod relative_strength;
pub mod weekly;

pub use breakout::BreakoutSignal;
pub use combiner::SignalCombiner;
pub use earnings::EarningsSignal;
pub use fundamental::FundamentalSignal;
pub use relative_strength::RelativeStrengthSignal;
pub use weekly::WeeklySignal;

use chrono::NaiveDate;

use crate::config::SignalParams;
use crate::domain::{EarningsRecord, FundamentalRecord};
use crate::indicators::{DailySnapshot, WeeklySnapshot};
use crate::indicators::calculator::RsView;

/// Policy-filtered inputs for one symbol on one evaluation date.
///
/// Every `Option` is None when the corresponding series is missing, still
/// warming up, or withheld by the timing policy; dependent signals evaluate
/// false rather than erroring.
pub struct SignalContext<'a> {
    pub symbol: &'a str,
    pub date: NaiveDate,
    pub daily: Option<&'a DailySnapshot>,
    pub weekly: Option<&'a WeeklySnapshot>,
    pub rs: Option<&'a RsView>,
    pub fundamental: Option<&'a FundamentalRecord>,
    pub earnings: Option<&'a EarningsRecord>,
    pub params: &'a SignalParams,
}

/// Uniform contract for one signal family.
pub trait ComponentSignal: Send + Sync {
    fn name(&self) -> &str;

    /// True when the family's condition holds on this date. Missing inputs
    /// are false, never an error.
    fn evaluate(&self, ctx: &SignalContext<'_>) -> bool;
}


#[cfg(test)]
pub mod test_support {
    //! Shared builders for signal tests.

    use super::*;
    use crate::indicators::calculator::BREAKOUT_WINDOWS;

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    /// A daily snapshot that clears every threshold the components check.
    pub fn strong_daily() -> DailySnapshot {
        DailySnapshot {
            date: date(),
            close: Some(150.0),
            high: Some(152.0),
            volume: Some(2_000_000.0),
            sma_20: Some(145.0),
            sma_50: Some(140.0),
            sma_200: Some(120.0),
            highest: [Some(152.0); BREAKOUT_WINDOWS.len()],
            prior_highest: [Some(149.0); BREAKOUT_WINDOWS.len()],
            adr: Some(3.0),
            adr_pct: Some(0.02),
            vol_sma_20: Some(1_500_000.0),
            vol_sma_50: Some(1_400_000.0),
            vol_ratio: Some(1.33),
            ma200_momentum: Some(1.2),
        }
    }

    pub fn strong_weekly() -> WeeklySnapshot {
        WeeklySnapshot {
            date: date(),
            close: Some(150.0),
            high_52w: Some(155.0),
            low_52w: Some(90.0),
            pct_of_52w_high: Some(150.0 / 155.0),
            sma_40w: Some(130.0),
            sma_40w_momentum: Some(0.8),
        }
    }

    pub fn strong_rs() -> RsView {
        RsView {
            date: date(),
            rs_4w: 95.0,
            rs_12w: 92.0,
            sector_rs: Some(88.0),
            industry_rs: None,
            rs_4w_ma: Some(93.0),
        }
    }

    pub fn strong_fundamental() -> FundamentalRecord {
        FundamentalRecord {
            date: date(),
            eps_growth_yoy: 0.30,
            revenue_growth_yoy: 0.18,
            market_cap: 5e9,
        }
    }

    pub fn strong_earnings() -> EarningsRecord {
        EarningsRecord {
            date: date(),
            surprise_pct: 0.08,
            eps_growth_yoy: 0.25,
        }
    }
}
