//! Position risk manager: per-date lifecycle decisions.
//!
//! The manager is side-effect free: `evaluate` inspects a position against
//! the day's bar and returns a decision; `apply_decision` mutates the
//! position and reports the cash flow and any completed trade. The engine
//! owns when decisions are computed (possibly in parallel) and when they
//! are applied (serially, behind the per-date barrier).

use chrono::NaiveDate;

use crate::config::RiskParams;
use crate::domain::{ExitReason, Position, PositionStatus, PriceBar, Trade};

use super::ratchet::{profit_units, stepped_stop};

/// What the manager wants done to one position after one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskDecision {
    /// Full exit of the remaining quantity at this price.
    pub exit: Option<(f64, ExitReason)>,
    /// One-time liquidation of half the position at this price.
    pub half_exit_price: Option<f64>,
    /// New high-water profit-unit count.
    pub profit_units: u32,
    /// Ladder stop for that unit count; applied through the monotonic
    /// `Position::raise_stop`.
    pub proposed_stop: f64,
}

/// Cash flow and ledger effect of applying a decision.
#[derive(Debug, Clone)]
pub struct AppliedRisk {
    pub cash_delta: f64,
    pub trade: Option<Trade>,
}

#[derive(Debug, Clone)]
pub struct RiskManager {
    params: RiskParams,
}

impl RiskManager {
    pub fn new(params: RiskParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    /// Protective stop at entry: entry * (1 - init_risk).
    pub fn initial_stop(&self, entry_price: f64) -> f64 {
        entry_price * (1.0 - self.params.init_risk)
    }

    /// Evaluate one open position against the day's bar.
    ///
    /// Stop-out is checked first, against the stop as it stood at the start
    /// of the day, and wins any same-bar collision with the target. Only a
    /// surviving position ratchets or half-exits.
    pub fn evaluate(&self, position: &Position, bar: &PriceBar) -> RiskDecision {
        debug_assert_eq!(position.symbol, bar.symbol);

        let hold = RiskDecision {
            exit: None,
            half_exit_price: None,
            profit_units: position.profit_units,
            proposed_stop: position.stop_price,
        };

        if !position.is_open() {
            return hold;
        }

        // Stop-out: fill at the stop price, conservative precedence.
        if bar.low <= position.stop_price {
            return RiskDecision {
                exit: Some((position.stop_price, ExitReason::StopLoss)),
                ..hold
            };
        }

        // Optional target take.
        if self.params.take_target {
            if let Some(target) = position.target_price {
                if bar.high >= target {
                    return RiskDecision {
                        exit: Some((target, ExitReason::Target)),
                        ..hold
                    };
                }
            }
        }

        let unrealized = position.unrealized_return(bar.close);
        let units = position
            .profit_units
            .max(profit_units(unrealized, self.params.std_risk));
        let proposed_stop = stepped_stop(position.entry_price, units, &self.params);

        let half_exit_price = (!position.half_exit_done
            && unrealized >= self.params.half_exit_trigger)
            .then_some(bar.close);

        RiskDecision {
            exit: None,
            half_exit_price,
            profit_units: units,
            proposed_stop,
        }
    }
}

/// Mutate the position per the decision; return cash flow and any trade.
pub fn apply_decision(
    position: &mut Position,
    decision: &RiskDecision,
    date: NaiveDate,
) -> AppliedRisk {
    if let Some((price, reason)) = decision.exit {
        let quantity = position.quantity;
        let cash_delta = quantity * price;
        position.realized_pnl += quantity * (price - position.entry_price);
        position.quantity = 0.0;
        position.status = PositionStatus::Closed;

        let trade = Trade {
            symbol: position.symbol.clone(),
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_date: date,
            exit_price: price,
            quantity: position.initial_quantity,
            pnl: position.realized_pnl,
            reason,
            half_exited: position.half_exit_done,
        };
        return AppliedRisk {
            cash_delta,
            trade: Some(trade),
        };
    }

    let mut cash_delta = 0.0;
    if let Some(price) = decision.half_exit_price {
        // The flag flips false -> true exactly once; evaluate() never
        // proposes a second half exit.
        let half = position.quantity / 2.0;
        cash_delta += half * price;
        position.realized_pnl += half * (price - position.entry_price);
        position.quantity -= half;
        position.half_exit_done = true;
        position.status = PositionStatus::HalfExited;
    }

    position.profit_units = position.profit_units.max(decision.profit_units);
    position.raise_stop(decision.proposed_stop);

    AppliedRisk {
        cash_delta,
        trade: None,
    }
}
