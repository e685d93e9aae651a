//! Crestline Core: point-in-time-correct multi-timeframe signal engine and
//! risk-managed trade lifecycle.
//!
//! The crate contains:
//! - Domain types (bars, dated series, records, positions, trades, portfolio)
//! - The timing policy separating live evaluation from backtest replay
//! - Rolling-window indicator computation with point-in-time snapshots
//! - Five-family signal combination into entry decisions
//! - The stepped-ratchet position risk manager
//! - The barrier-synchronized backtest execution loop
//!
//! Decision logic is identical in both execution modes; the only difference
//! is which column of the timing-policy rule table applies.

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod risk;
pub mod signals;
pub mod store;
pub mod timing;
