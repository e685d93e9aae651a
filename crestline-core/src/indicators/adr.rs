//! Average daily range: rolling mean of (high - low).
//!
//! `AvgDailyRange` is the absolute form used for target/stop construction;
//! `AdrPercent` expresses it as a fraction of the bar's close.

use crate::domain::PriceBar;
use crate::indicators::Indicator;

#[derive(Debug, Clone)]
pub struct AvgDailyRange {
    period: usize,
    name: String,
}

impl AvgDailyRange {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADR period must be >= 1");
        Self {
            period,
            name: format!("adr_{period}"),
        }
    }
}

impl Indicator for AvgDailyRange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            let mut sum = 0.0;
            let mut poisoned = false;
            for bar in window {
                let range = bar.high - bar.low;
                if range.is_nan() {
                    poisoned = true;
                    break;
                }
                sum += range;
            }
            result[i] = if poisoned {
                f64::NAN
            } else {
                sum / self.period as f64
            };
        }

        result
    }
}

/// ADR divided by the same bar's close.
#[derive(Debug, Clone)]
pub struct AdrPercent {
    inner: AvgDailyRange,
    name: String,
}

impl AdrPercent {
    pub fn new(period: usize) -> Self {
        Self {
            inner: AvgDailyRange::new(period),
            name: format!("adr_pct_{period}"),
        }
    }
}

impl Indicator for AdrPercent {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.inner.lookback()
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let mut result = self.inner.compute(bars);
        for (i, value) in result.iter_mut().enumerate() {
            let close = bars[i].close;
            *value = if close.is_nan() || close <= 0.0 {
                f64::NAN
            } else {
                *value / close
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn adr_basic() {
        // make_bars ranges: |open-close| + 2.0
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0]);
        let result = AvgDailyRange::new(2).compute(&bars);

        assert!(result[0].is_nan());
        // ranges: 2, 4, 3, 6
        assert_approx(result[1], 3.0, DEFAULT_EPSILON);
        assert_approx(result[2], 3.5, DEFAULT_EPSILON);
        assert_approx(result[3], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn adr_pct_relative_to_close() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0]);
        let result = AdrPercent::new(2).compute(&bars);
        assert_approx(result[1], 3.0 / 12.0, DEFAULT_EPSILON);
        assert_approx(result[3], 4.5 / 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn adr_poisoned_window() {
        let mut bars = make_bars(&[10.0, 12.0, 11.0]);
        bars[1].high = f64::NAN;
        let result = AvgDailyRange::new(2).compute(&bars);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
    }
}
