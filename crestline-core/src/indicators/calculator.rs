//! Per-symbol indicator state: precomputed series plus point-in-time
//! snapshot accessors.
//!
//! A `SymbolIndicators` instance owns everything derived for one symbol in
//! one run. It is built once before the date loop and read through the
//! timing policy afterwards; there is no process-wide cache, so concurrent
//! runs over different universes cannot interfere.
//!
//! Data-quality-flagged bars (high < low, negative volume, ...) are masked
//! to NaN before any window is computed, which excludes them from every
//! indicator they would otherwise enter. Such bars are also withheld from
//! fills: a corrupt print is not a tradable price.

use chrono::NaiveDate;

use crate::domain::{
    DateSeries, EarningsRecord, FundamentalRecord, PriceBar, RelativeStrengthRecord,
};
use crate::indicators::relative_strength::RS_SMOOTHING_DAYS;
use crate::indicators::{
    AdrPercent, AvgDailyRange, Indicator, IndicatorValues, MaMomentum, RollingHigh, RollingLow,
    Sma, VolumeRatio, VolumeSma,
};
use crate::timing::{SeriesFamily, TimingPolicy};

/// Daily rolling-high windows behind Highest_1M .. Highest_2Y, in months:
/// 1, ~3, ~6, ~12, ~24.
pub const BREAKOUT_WINDOWS: [usize; 5] = [20, 50, 100, 200, 400];

/// All raw inputs for one symbol.
#[derive(Debug, Clone)]
pub struct SymbolFrame {
    pub symbol: String,
    pub daily: DateSeries<PriceBar>,
    pub weekly: DateSeries<PriceBar>,
    pub relative_strength: Option<DateSeries<RelativeStrengthRecord>>,
    pub fundamentals: Option<DateSeries<FundamentalRecord>>,
    pub earnings: Option<DateSeries<EarningsRecord>>,
}

/// Point-in-time view of the daily technical family.
///
/// `highest` holds the rolling highs for the windows in `BREAKOUT_WINDOWS`,
/// ending at the snapshot bar; `prior_highest` holds the same windows ending
/// one bar earlier, which is what a breakout compares the snapshot high
/// against.
#[derive(Debug, Clone)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub volume: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub highest: [Option<f64>; BREAKOUT_WINDOWS.len()],
    pub prior_highest: [Option<f64>; BREAKOUT_WINDOWS.len()],
    pub adr: Option<f64>,
    pub adr_pct: Option<f64>,
    pub vol_sma_20: Option<f64>,
    pub vol_sma_50: Option<f64>,
    pub vol_ratio: Option<f64>,
    pub ma200_momentum: Option<f64>,
}

/// Point-in-time view of the weekly family.
#[derive(Debug, Clone)]
pub struct WeeklySnapshot {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    /// close / 52-week high; 1.0 means a close exactly at the high.
    pub pct_of_52w_high: Option<f64>,
    pub sma_40w: Option<f64>,
    pub sma_40w_momentum: Option<f64>,
}

/// Point-in-time view of the relative-strength family.
#[derive(Debug, Clone)]
pub struct RsView {
    pub date: NaiveDate,
    pub rs_4w: f64,
    pub rs_12w: f64,
    pub sector_rs: Option<f64>,
    pub industry_rs: Option<f64>,
    /// Short moving average of the 4-week value.
    pub rs_4w_ma: Option<f64>,
}

/// Precomputed indicator state for one symbol.
#[derive(Debug, Clone)]
pub struct SymbolIndicators {
    frame: SymbolFrame,
    daily_masked: Vec<PriceBar>,
    weekly_masked: Vec<PriceBar>,
    daily_values: IndicatorValues,
    weekly_values: IndicatorValues,
    rs_4w_ma: Vec<f64>,
    flagged_daily: usize,
    flagged_weekly: usize,
}

impl SymbolIndicators {
    pub fn build(frame: SymbolFrame) -> Self {
        let (daily_masked, flagged_daily) = mask_flagged(frame.daily.as_slice());
        let (weekly_masked, flagged_weekly) = mask_flagged(frame.weekly.as_slice());

        let mut daily_values = IndicatorValues::new();
        for indicator in daily_indicator_set() {
            daily_values.insert(indicator.name().to_string(), indicator.compute(&daily_masked));
        }

        let mut weekly_values = IndicatorValues::new();
        for indicator in weekly_indicator_set() {
            weekly_values.insert(indicator.name().to_string(), indicator.compute(&weekly_masked));
        }

        let rs_4w_ma = frame
            .relative_strength
            .as_ref()
            .map(|s| smooth_rs(s))
            .unwrap_or_default();

        Self {
            frame,
            daily_masked,
            weekly_masked,
            daily_values,
            weekly_values,
            rs_4w_ma,
            flagged_daily,
            flagged_weekly,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.frame.symbol
    }

    pub fn frame(&self) -> &SymbolFrame {
        &self.frame
    }

    pub fn flagged_bar_count(&self) -> usize {
        self.flagged_daily + self.flagged_weekly
    }

    /// The bar dated exactly `t`, if present and clean. Used for fills and
    /// risk evaluation; a flagged bar is treated as missing for the date.
    pub fn tradable_bar_on(&self, t: NaiveDate) -> Option<&PriceBar> {
        let idx = self.frame.daily.index_of(t)?;
        let bar = self.frame.daily.get(idx)?;
        bar.is_sane().then_some(bar)
    }

    /// Last clean close admitted by `cutoff`, for mark-to-market and
    /// exposure accounting.
    pub fn mark_price(&self, cutoff: crate::timing::ObservationCutoff) -> Option<f64> {
        let idx = self.frame.daily.latest_admitted(cutoff)?;
        self.daily_masked[..=idx]
            .iter()
            .rev()
            .map(|b| b.close)
            .find(|c| !c.is_nan())
    }

    pub fn daily_snapshot(&self, policy: &TimingPolicy, t: NaiveDate) -> Option<DailySnapshot> {
        let cutoff = policy.cutoff(SeriesFamily::DailyTechnical, t);
        let j = self.frame.daily.latest_admitted(cutoff)?;
        let bar = &self.daily_masked[j];
        let at = |name: &str| self.daily_values.at(name, j);
        let prior = |name: &str| j.checked_sub(1).and_then(|k| self.daily_values.at(name, k));

        let mut highest = [None; BREAKOUT_WINDOWS.len()];
        let mut prior_highest = [None; BREAKOUT_WINDOWS.len()];
        for (slot, window) in BREAKOUT_WINDOWS.iter().enumerate() {
            let name = format!("high_{window}");
            highest[slot] = at(&name);
            prior_highest[slot] = prior(&name);
        }

        Some(DailySnapshot {
            date: bar.date,
            close: finite(bar.close),
            high: finite(bar.high),
            volume: finite(bar.volume),
            sma_20: at("sma_20"),
            sma_50: at("sma_50"),
            sma_200: at("sma_200"),
            highest,
            prior_highest,
            adr: at("adr_20"),
            adr_pct: at("adr_pct_20"),
            vol_sma_20: at("vol_sma_20"),
            vol_sma_50: at("vol_sma_50"),
            vol_ratio: at("vol_ratio_20"),
            ma200_momentum: at("ma_mom_200_3"),
        })
    }

    pub fn weekly_snapshot(&self, policy: &TimingPolicy, t: NaiveDate) -> Option<WeeklySnapshot> {
        let cutoff = policy.cutoff(SeriesFamily::Weekly, t);
        let j = self.frame.weekly.latest_admitted(cutoff)?;
        let bar = &self.weekly_masked[j];
        let at = |name: &str| self.weekly_values.at(name, j);

        let close = finite(bar.close);
        let high_52w = at("high_52");
        let pct_of_52w_high = match (close, high_52w) {
            (Some(c), Some(h)) if h > 0.0 => Some(c / h),
            _ => None,
        };

        Some(WeeklySnapshot {
            date: bar.date,
            close,
            high_52w,
            low_52w: at("low_52"),
            pct_of_52w_high,
            sma_40w: at("sma_40"),
            sma_40w_momentum: at("ma_mom_40_3"),
        })
    }

    pub fn relative_strength_at(&self, policy: &TimingPolicy, t: NaiveDate) -> Option<RsView> {
        let series = self.frame.relative_strength.as_ref()?;
        let cutoff = policy.cutoff(SeriesFamily::RelativeStrength, t);
        let j = series.latest_admitted(cutoff)?;
        let record = series.get(j)?;

        Some(RsView {
            date: record.date,
            rs_4w: record.rs_4w,
            rs_12w: record.rs_12w,
            sector_rs: record.sector_rs,
            industry_rs: record.industry_rs,
            rs_4w_ma: self.rs_4w_ma.get(j).copied().filter(|v| !v.is_nan()),
        })
    }

    /// Forward-filled fundamental record: the latest admitted quarterly
    /// value holds for every daily date until the next record.
    pub fn fundamental_at(&self, policy: &TimingPolicy, t: NaiveDate) -> Option<&FundamentalRecord> {
        let series = self.frame.fundamentals.as_ref()?;
        let cutoff = policy.cutoff(SeriesFamily::Fundamental, t);
        series.get(series.latest_admitted(cutoff)?)
    }

    pub fn earnings_at(&self, policy: &TimingPolicy, t: NaiveDate) -> Option<&EarningsRecord> {
        let series = self.frame.earnings.as_ref()?;
        let cutoff = policy.cutoff(SeriesFamily::Earnings, t);
        series.get(series.latest_admitted(cutoff)?)
    }
}

fn finite(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

/// NaN out every field of bars failing the data-quality check.
fn mask_flagged(bars: &[PriceBar]) -> (Vec<PriceBar>, usize) {
    let mut flagged = 0;
    let masked = bars
        .iter()
        .map(|bar| {
            if bar.is_sane() {
                bar.clone()
            } else {
                flagged += 1;
                PriceBar {
                    symbol: bar.symbol.clone(),
                    date: bar.date,
                    open: f64::NAN,
                    high: f64::NAN,
                    low: f64::NAN,
                    close: f64::NAN,
                    volume: f64::NAN,
                }
            }
        })
        .collect();
    (masked, flagged)
}

fn daily_indicator_set() -> Vec<Box<dyn Indicator>> {
    let mut set: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Sma::new(200)),
        Box::new(AvgDailyRange::new(20)),
        Box::new(AdrPercent::new(20)),
        Box::new(VolumeSma::new(20)),
        Box::new(VolumeSma::new(50)),
        Box::new(VolumeRatio::new(20)),
        Box::new(MaMomentum::new(200, 3)),
    ];
    for window in BREAKOUT_WINDOWS {
        set.push(Box::new(RollingHigh::new(window)));
    }
    set
}

fn weekly_indicator_set() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(RollingHigh::new(52)),
        Box::new(RollingLow::new(52)),
        Box::new(Sma::new(40)),
        Box::new(MaMomentum::new(40, 3)),
    ]
}

/// Rolling mean of rs_4w over the smoothing window, aligned to the records.
fn smooth_rs(series: &DateSeries<RelativeStrengthRecord>) -> Vec<f64> {
    let n = series.len();
    let mut out = vec![f64::NAN; n];
    for i in (RS_SMOOTHING_DAYS - 1)..n {
        let window = (i + 1 - RS_SMOOTHING_DAYS)..=i;
        let sum: f64 = window.clone().map(|k| series.get(k).unwrap().rs_4w).sum();
        out[i] = sum / RS_SMOOTHING_DAYS as f64;
    }
    out
}
