//! Engine state and run result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, Portfolio, SignalEvaluation, Trade};

/// Mutable state for one run. Owned by the loop, mutated only behind the
/// per-date barrier.
#[derive(Debug)]
pub struct EngineState {
    pub portfolio: Portfolio,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Symbol -> first calendar index at which re-entry is allowed again.
    pub cooldown_until: HashMap<String, usize>,
    /// Per-date evaluation trace, populated only when tracing is on.
    pub evaluations: Vec<SignalEvaluation>,
    pub warnings: Vec<String>,
}

impl EngineState {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            portfolio: Portfolio::new(initial_cash),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            cooldown_until: HashMap::new(),
            evaluations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn cooling_down(&self, symbol: &str, calendar_index: usize) -> bool {
        self.cooldown_until
            .get(symbol)
            .is_some_and(|&until| calendar_index < until)
    }
}

/// Everything a finished run hands back.
///
/// Metrics are derived downstream, solely from the trade ledger and the
/// equity curve carried here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    /// Full per-date signal trace; empty unless `trace_signals` was set.
    pub evaluations: Vec<SignalEvaluation>,
    pub warnings: Vec<String>,
    pub session_count: usize,
    pub symbol_count: usize,
    pub final_equity: f64,
}
