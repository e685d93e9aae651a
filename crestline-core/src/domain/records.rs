//! Relative-strength, fundamental and earnings records.
//!
//! These arrive from collaborators already timestamped; the core only applies
//! the timing policy to them. Fundamental and earnings records are quarterly
//! and are forward-filled to daily granularity at lookup time (the latest
//! record at or before the cutoff holds until the next one).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::Dated;

/// Per-symbol relative strength versus a benchmark.
///
/// `rs_4w`/`rs_12w` are percentile-style ratings (1..=99 when ranked across
/// a universe) over roughly 4- and 12-week horizons. Sector and industry
/// variants are optional: not every upstream supplies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeStrengthRecord {
    pub date: NaiveDate,
    pub rs_4w: f64,
    pub rs_12w: f64,
    pub sector_rs: Option<f64>,
    pub industry_rs: Option<f64>,
}

impl Dated for RelativeStrengthRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Quarterly fundamental snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalRecord {
    pub date: NaiveDate,
    /// Year-over-year earnings-per-share growth, as a fraction (0.25 = +25%).
    pub eps_growth_yoy: f64,
    /// Year-over-year revenue growth, as a fraction.
    pub revenue_growth_yoy: f64,
    pub market_cap: f64,
}

impl Dated for FundamentalRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Quarterly earnings report outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub date: NaiveDate,
    /// Reported EPS versus consensus, as a fraction (0.10 = +10% beat).
    pub surprise_pct: f64,
    pub eps_growth_yoy: f64,
}

impl Dated for EarningsRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
