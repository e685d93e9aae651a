//! PriceBar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::Dated;

/// OHLCV bar for a single symbol on a single observation date.
///
/// Daily and weekly bars share this shape and live in separate series per
/// symbol. A weekly bar's `date` is the last trading day of its week.
/// Bars are immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Data-quality check: high >= low, OHLC within the high/low range,
    /// positive prices, non-negative volume.
    ///
    /// Bars that fail are flagged and excluded from every indicator window
    /// they would otherwise enter; they never abort a run.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
            && !self.open.is_nan()
            && !self.high.is_nan()
            && !self.low.is_nan()
            && !self.close.is_nan()
    }

    /// Intraday range, the input to the average-daily-range indicator.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

impl Dated for PriceBar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Roll a daily series up to ISO weeks.
///
/// Each weekly bar carries the week's first open, highest high, lowest low,
/// last close and summed volume, dated at the week's last trading day.
/// Stores that only hold daily bars build their weekly series with this.
pub fn resample_weekly(daily: &super::series::DateSeries<PriceBar>) -> super::series::DateSeries<PriceBar> {
    use chrono::Datelike;

    let mut weekly: Vec<PriceBar> = Vec::new();
    let mut current_week: Option<(i32, u32)> = None;

    for bar in daily.iter() {
        let week = bar.date.iso_week();
        let key = (week.year(), week.week());
        match (weekly.last_mut(), current_week) {
            (Some(acc), Some(open_week)) if open_week == key => {
                acc.date = bar.date;
                acc.high = acc.high.max(bar.high);
                acc.low = acc.low.min(bar.low);
                acc.close = bar.close;
                acc.volume += bar.volume;
            }
            _ => {
                weekly.push(bar.clone());
                current_week = Some(key);
            }
        }
    }

    super::series::DateSeries::new(weekly)
        .expect("weekly bars inherit the daily series' date order")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> PriceBar {
        PriceBar {
            symbol: "ACME".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_inverted_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_negative_volume() {
        let mut bar = sample_bar();
        bar.volume = -1.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_nan_price() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_range() {
        assert!((sample_bar().range() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn resample_weekly_rolls_up_ohlcv() {
        use crate::domain::DateSeries;

        // Mon 2024-01-08 .. Wed 2024-01-17: one full week plus three days.
        let mut bars = Vec::new();
        for (i, day) in [8, 9, 10, 11, 12, 15, 16, 17].iter().enumerate() {
            bars.push(PriceBar {
                symbol: "ACME".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, *day).unwrap(),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.5 + i as f64,
                volume: 1000.0,
            });
        }
        let weekly = resample_weekly(&DateSeries::new(bars).unwrap());

        assert_eq!(weekly.len(), 2);
        let first = weekly.get(0).unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 105.0);
        assert_eq!(first.low, 99.0);
        assert_eq!(first.close, 104.5);
        assert_eq!(first.volume, 5000.0);
        let second = weekly.get(1).unwrap();
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(second.volume, 3000.0);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: PriceBar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.symbol, deser.symbol);
        assert_eq!(bar.date, deser.date);
        assert_eq!(bar.close, deser.close);
    }
}
