//! Rolling-window indicator implementations.
//!
//! Indicators are pure functions: bar history in, numeric series out, one
//! output value per input bar. They are precomputed once per symbol before
//! the date loop and indexed per evaluation date through the timing policy.
//!
//! The first `lookback()` values of every output are `f64::NAN` (warmup).
//! NaN also marks windows poisoned by a data-quality-flagged bar, so
//! "unavailable" is never confused with zero.

pub mod adr;
pub mod calculator;
pub mod relative_strength;
pub mod rolling_high;
pub mod sma;
pub mod trend_momentum;
pub mod volume;

pub use adr::{AdrPercent, AvgDailyRange};
pub use calculator::{DailySnapshot, SymbolFrame, SymbolIndicators, WeeklySnapshot};
pub use rolling_high::{RollingHigh, RollingLow};
pub use sma::Sma;
pub use trend_momentum::MaMomentum;
pub use volume::{VolumeRatio, VolumeSma};

use crate::domain::PriceBar;
use std::collections::HashMap;

/// Trait for rolling-window indicators.
///
/// No output value at index t may depend on bars after t; every indicator
/// must pass the truncated-vs-full lookahead test.
pub trait Indicator: Send + Sync {
    /// Series name the output is stored under (e.g. "sma_20", "high_400").
    fn name(&self) -> &str;

    /// Number of bars consumed before the first valid output.
    fn lookback(&self) -> usize;

    /// Compute the output series, same length as `bars`.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Named precomputed indicator series for one bar series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at a bar index; NaN (warmup / poisoned window) maps to None.
    pub fn at(&self, name: &str, index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }
}

/// Create synthetic daily bars from close prices for testing.
///
/// open = prior close, high/low bracket the body by 1.0, volume 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
