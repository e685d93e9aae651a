//! Rolling extremes: highest high / lowest low over a lookback window.
//!
//! `RollingHigh` over 20/50/100/200/400 daily bars produces the
//! Highest_1M..Highest_2Y series the breakout signal consumes; over 52
//! weekly bars it produces the 52-week high. The window includes the
//! current bar, so a breakout test compares a bar's high against the
//! value one index earlier.

use crate::domain::PriceBar;
use crate::indicators::Indicator;

#[derive(Debug, Clone)]
pub struct RollingHigh {
    period: usize,
    name: String,
}

impl RollingHigh {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RollingHigh period must be >= 1");
        Self {
            period,
            name: format!("high_{period}"),
        }
    }
}

impl Indicator for RollingHigh {
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
            let mut max_val = f64::NEG_INFINITY;
            let mut poisoned = false;
            for bar in window {
                if bar.high.is_nan() {
                    poisoned = true;
                    break;
                }
                if bar.high > max_val {
                    max_val = bar.high;
                }
            }
            result[i] = if poisoned { f64::NAN } else { max_val };
        }

        result
    }
}

#[derive(Debug, Clone)]
pub struct RollingLow {
    period: usize,
    name: String,
}

impl RollingLow {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RollingLow period must be >= 1");
        Self {
            period,
            name: format!("low_{period}"),
        }
    }
}

impl Indicator for RollingLow {
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
            let mut min_val = f64::INFINITY;
            let mut poisoned = false;
            for bar in window {
                if bar.low.is_nan() {
                    poisoned = true;
                    break;
                }
                if bar.low < min_val {
                    min_val = bar.low;
                }
            }
            result[i] = if poisoned { f64::NAN } else { min_val };
        }

        result
    }
}
