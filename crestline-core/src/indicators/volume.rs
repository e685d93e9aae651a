//! Volume statistics: rolling volume mean and latest-to-mean ratio.

use crate::domain::PriceBar;
use crate::indicators::Indicator;

#[derive(Debug, Clone)]
pub struct VolumeSma {
    period: usize,
    name: String,
}

impl VolumeSma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume SMA period must be >= 1");
        Self {
            period,
            name: format!("vol_sma_{period}"),
        }
    }
}

impl Indicator for VolumeSma {
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
                if bar.volume.is_nan() {
                    poisoned = true;
                    break;
                }
                sum += bar.volume;
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

/// Latest volume divided by its rolling mean: > 1 means above-average
/// participation on the current bar.
#[derive(Debug, Clone)]
pub struct VolumeRatio {
    inner: VolumeSma,
    name: String,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        Self {
            inner: VolumeSma::new(period),
            name: format!("vol_ratio_{period}"),
        }
    }
}

impl Indicator for VolumeRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.inner.lookback()
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let mut result = self.inner.compute(bars);
        for (i, value) in result.iter_mut().enumerate() {
            let volume = bars[i].volume;
            *value = if volume.is_nan() || *value <= 0.0 {
                f64::NAN
            } else {
                volume / *value
            };
        }
        result
    }
}
