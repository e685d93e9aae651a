//! Trade: realized record appended to the immutable ledger on full exit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    Target,
    /// Forced liquidation at the final session of a replay.
    EndOfRun,
}

/// A completed round trip.
///
/// `quantity` is the entry quantity; a partial exit's realized PnL is folded
/// into `pnl` and flagged by `half_exited` rather than producing a second
/// ledger row, so trade counts equal closed positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub reason: ExitReason,
    pub half_exited: bool,
}

impl Trade {
    /// Return as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price <= 0.0 || self.quantity <= 0.0 {
            return 0.0;
        }
        self.pnl / (self.entry_price * self.quantity)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade {
            symbol: "ACME".into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            entry_price: 100.0,
            exit_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            exit_price: 110.0,
            quantity: 50.0,
            pnl: 500.0,
            reason: ExitReason::Target,
            half_exited: false,
        }
    }

    #[test]
    fn return_pct_calculation() {
        let trade = sample_trade();
        assert!((trade.return_pct() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade().is_winner());
        let mut loser = sample_trade();
        loser.pnl = -120.0;
        assert!(!loser.is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.symbol, deser.symbol);
        assert_eq!(trade.pnl, deser.pnl);
        assert_eq!(trade.reason, deser.reason);
    }
}
