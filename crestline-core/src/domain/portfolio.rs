//! Portfolio: aggregate state of cash plus all open positions.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// One equity-curve sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cash plus open positions, keyed by symbol (at most one per symbol).
///
/// Mutated once per simulated date by the execution loop, behind its
/// per-date barrier; nothing else writes to it.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub positions: HashMap<String, Position>,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            positions: HashMap::new(),
        }
    }

    /// Total equity: cash + sum of position market values at `prices`.
    ///
    /// A symbol with no quote (skipped date) is marked at its entry price.
    pub fn equity(&self, prices: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .filter(|p| p.is_open())
            .map(|p| {
                let price = prices.get(&p.symbol).copied().unwrap_or(p.entry_price);
                p.market_value(price)
            })
            .sum();
        self.cash + position_value
    }

    /// Market value of open positions only, for exposure accounting.
    pub fn exposure(&self, prices: &HashMap<String, f64>) -> f64 {
        self.equity(prices) - self.cash
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.get(symbol).is_some_and(|p| p.is_open())
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol).filter(|p| p.is_open())
    }

    pub fn position_mut(&mut self, symbol: &str) -> Option<&mut Position> {
        self.positions.get_mut(symbol).filter(|p| p.is_open())
    }

    /// Symbols with open positions, sorted for deterministic iteration.
    pub fn open_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .positions
            .values()
            .filter(|p| p.is_open())
            .map(|p| p.symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }
}
