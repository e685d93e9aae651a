//! Position: per-symbol trade lifecycle state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    HalfExited,
    Closed,
}

/// An open (or closing) long position.
///
/// Created on entry-signal acceptance, mutated only by the risk manager's
/// applied decisions, archived as a `Trade` on full exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// Remaining share count (halved after a partial exit).
    pub quantity: f64,
    /// Share count at entry, before any partial exit.
    pub initial_quantity: f64,
    /// Current protective stop. Monotonically non-decreasing for the life
    /// of the position; all updates go through `raise_stop`.
    pub stop_price: f64,
    /// Optional profit target from the accepted signal evaluation.
    pub target_price: Option<f64>,
    /// Ratchet steps banked so far (floor(unrealized / std_risk) high-water).
    pub profit_units: u32,
    /// Set once, on the first close at or beyond the half-exit trigger.
    pub half_exit_done: bool,
    pub status: PositionStatus,
    /// PnL realized by the partial exit, folded into the final trade.
    pub realized_pnl: f64,
}

impl Position {
    pub fn open(
        symbol: String,
        entry_date: NaiveDate,
        entry_price: f64,
        quantity: f64,
        initial_stop: f64,
        target_price: Option<f64>,
    ) -> Self {
        Self {
            symbol,
            entry_date,
            entry_price,
            quantity,
            initial_quantity: quantity,
            stop_price: initial_stop,
            target_price,
            profit_units: 0,
            half_exit_done: false,
            status: PositionStatus::Open,
            realized_pnl: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status != PositionStatus::Closed
    }

    /// Unrealized return at `price`, as a fraction of the entry price.
    pub fn unrealized_return(&self, price: f64) -> f64 {
        if self.entry_price <= 0.0 {
            return 0.0;
        }
        (price - self.entry_price) / self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Raise the stop to `proposed` if it is higher than the current stop.
    ///
    /// The single mutation point for the stop price; lowering is silently
    /// ignored, which is what makes invariant "stop is monotonically
    /// non-decreasing" hold by construction.
    pub fn raise_stop(&mut self, proposed: f64) -> f64 {
        if proposed > self.stop_price {
            self.stop_price = proposed;
        }
        self.stop_price
    }
}
