//! Performance metrics: pure functions over the equity curve and ledger.
//!
//! Every metric takes the trade ledger and/or equity curve and returns a
//! scalar; nothing here touches the engine or any I/O. Field names on
//! `PerformanceMetrics` are part of the report contract and round-trip
//! through serde unchanged.

use serde::{Deserialize, Serialize};

use crestline_core::domain::{EquityPoint, Trade};

/// Trading sessions per year, for annualization.
const SESSIONS_PER_YEAR: f64 = 252.0;

/// Aggregate performance for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub max_drawdown: f64,
    /// Mean daily return over its standard deviation, annualized.
    pub risk_adjusted: f64,
    pub win_rate: f64,
    pub trade_count: usize,
}

impl PerformanceMetrics {
    pub fn compute(equity_curve: &[EquityPoint], trades: &[Trade]) -> Self {
        let values: Vec<f64> = equity_curve.iter().map(|p| p.value).collect();
        Self {
            total_return: total_return(&values),
            max_drawdown: max_drawdown(&values),
            risk_adjusted: risk_adjusted(&values),
            win_rate: win_rate(trades),
            trade_count: trades.len(),
        }
    }
}

/// (final - initial) / initial; 0.0 for degenerate curves.
pub fn total_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let initial = equity[0];
    if initial <= 0.0 {
        return 0.0;
    }
    (equity[equity.len() - 1] - initial) / initial
}

/// Maximum peak-to-trough decline, as a negative fraction.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized mean-over-std of daily returns; 0.0 when variance vanishes.
pub fn risk_adjusted(equity: &[f64]) -> f64 {
    let returns = daily_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * SESSIONS_PER_YEAR.sqrt()
}

pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

pub fn daily_returns(equity: &[f64]) -> Vec<f64> {
    if equity.len() < 2 {
        return Vec::new();
    }
    equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crestline_core::domain::ExitReason;

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityPoint {
                date: base + chrono::Duration::days(i as i64),
                value,
            })
            .collect()
    }

    fn trade(pnl: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        Trade {
            symbol: "ACME".into(),
            entry_date: date,
            entry_price: 100.0,
            exit_date: date,
            exit_price: 100.0 + pnl / 50.0,
            quantity: 50.0,
            pnl,
            reason: ExitReason::StopLoss,
            half_exited: false,
        }
    }

    #[test]
    fn total_return_basic() {
        assert!((total_return(&[100_000.0, 105_000.0, 110_000.0]) - 0.1).abs() < 1e-10);
        assert!((total_return(&[100_000.0, 90_000.0]) + 0.1).abs() < 1e-10);
        assert_eq!(total_return(&[100_000.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_known_value() {
        let dd = max_drawdown(&[100_000.0, 110_000.0, 90_000.0, 95_000.0]);
        let expected = (90_000.0 - 110_000.0) / 110_000.0;
        assert!((dd - expected).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotone_curve_is_zero() {
        let values: Vec<f64> = (0..100).map(|i| 100_000.0 + 100.0 * i as f64).collect();
        assert_eq!(max_drawdown(&values), 0.0);
    }

    #[test]
    fn risk_adjusted_zero_for_constant_returns() {
        let mut values = vec![100_000.0];
        for i in 1..200 {
            values.push(values[i - 1] * 1.001);
        }
        assert_eq!(risk_adjusted(&values), 0.0);
    }

    #[test]
    fn risk_adjusted_positive_for_positive_drifting_returns() {
        let mut values = vec![100_000.0];
        for i in 1..253 {
            let r = if i % 2 == 0 { 1.002 } else { 1.0005 };
            values.push(values[i - 1] * r);
        }
        let ra = risk_adjusted(&values);
        assert!(ra > 1.0, "expected strongly positive ratio, got {ra}");
    }

    #[test]
    fn win_rate_mixed() {
        let trades = vec![trade(500.0), trade(-200.0), trade(300.0), trade(-100.0)];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-10);
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn compute_all_fields() {
        let trades = vec![trade(500.0), trade(-200.0)];
        let metrics = PerformanceMetrics::compute(&curve(&[100_000.0, 101_000.0, 100_500.0]), &trades);
        assert!(metrics.total_return > 0.0);
        assert!(metrics.max_drawdown < 0.0);
        assert_eq!(metrics.trade_count, 2);
        assert!((metrics.win_rate - 0.5).abs() < 1e-10);
        assert!(metrics.risk_adjusted.is_finite());
    }

    #[test]
    fn metrics_field_names_round_trip() {
        let metrics = PerformanceMetrics {
            total_return: 0.42,
            max_drawdown: -0.18,
            risk_adjusted: 1.3,
            win_rate: 0.6,
            trade_count: 25,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        for field in [
            "total_return",
            "max_drawdown",
            "risk_adjusted",
            "win_rate",
            "trade_count",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        let back: PerformanceMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(back.trade_count, 25);
    }
}
