//! Stepped stop ladder.
//!
//! One profit unit is banked per `std_risk` of unrealized return. Below the
//! first unit the stop stays at the entry discount; from the first unit on,
//! the stop steps to entry * (1 + (units - 1) * std_risk). Units are a
//! high-water mark and the stop itself only ever rises, so a later fall in
//! unrealized return never lowers the ladder.

use crate::config::RiskParams;

/// Whole profit units earned at an unrealized return.
pub fn profit_units(unrealized_return: f64, std_risk: f64) -> u32 {
    if unrealized_return <= 0.0 || std_risk <= 0.0 {
        return 0;
    }
    (unrealized_return / std_risk).floor() as u32
}

/// Stop level for a banked unit count.
pub fn stepped_stop(entry_price: f64, units: u32, params: &RiskParams) -> f64 {
    if units < 1 {
        entry_price * (1.0 - params.init_risk)
    } else {
        entry_price * (1.0 + (units - 1) as f64 * params.std_risk)
    }
}
