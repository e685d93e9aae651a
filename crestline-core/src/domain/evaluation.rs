//! SignalEvaluation: the combiner's per-symbol, per-date verdict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating the five component signals for one symbol on one
/// date. Produced fresh each evaluation date, never mutated.
///
/// `target_price`/`stop_price` are derived from the average daily range of
/// the last admitted snapshot, so the whole struct is computable under the
/// timing policy with no same-day data in backtest mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub symbol: String,
    pub date: NaiveDate,

    pub weekly: bool,
    pub breakout: bool,
    pub relative_strength: bool,
    pub fundamental: bool,
    pub earnings: bool,

    /// Conjunction of the required components (earnings only when gated).
    pub entry: bool,
    /// Weighted component score in [0, 1], for ranking simultaneous
    /// candidates. Weights come from configuration and sum to 1.
    pub strength: f64,

    pub target_price: Option<f64>,
    pub stop_price: Option<f64>,
}

impl SignalEvaluation {
    /// An evaluation with every component false (missing data, cooldown).
    pub fn rejected(symbol: &str, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            weekly: false,
            breakout: false,
            relative_strength: false,
            fundamental: false,
            earnings: false,
            entry: false,
            strength: 0.0,
            target_price: None,
            stop_price: None,
        }
    }
}
