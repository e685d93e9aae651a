//! Position and risk management: stepped ratchet, half exit, stop-out,
//! whipsaw cooldown inputs.

pub mod manager;
pub mod ratchet;

pub use manager::{apply_decision, AppliedRisk, RiskDecision, RiskManager};
pub use ratchet::{profit_units, stepped_stop};
