//! Long-trend momentum: percentage change of a moving average over the
//! most recent few observations.
//!
//! On daily bars with period 200 / span 3 this is the "is the 200-bar
//! average still rising" measure; on weekly bars with period 40 / span 3
//! it backs the weekly trend condition.

use crate::domain::PriceBar;
use crate::indicators::{Indicator, Sma};

#[derive(Debug, Clone)]
pub struct MaMomentum {
    ma: Sma,
    span: usize,
    name: String,
}

impl MaMomentum {
    pub fn new(ma_period: usize, span: usize) -> Self {
        assert!(span >= 1, "momentum span must be >= 1");
        Self {
            ma: Sma::new(ma_period),
            span,
            name: format!("ma_mom_{ma_period}_{span}"),
        }
    }
}

impl Indicator for MaMomentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.ma.lookback() + self.span
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let ma = self.ma.compute(bars);
        let n = ma.len();
        let mut result = vec![f64::NAN; n];

        for i in self.span..n {
            let prev = ma[i - self.span];
            let curr = ma[i];
            if prev.is_nan() || curr.is_nan() || prev == 0.0 {
                continue;
            }
            result[i] = (curr - prev) / prev * 100.0;
        }

        result
    }
}
