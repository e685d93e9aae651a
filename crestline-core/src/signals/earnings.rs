//! Earnings-surprise signal.
//!
//! Whether this component gates entry or is informational only is a
//! configuration toggle (`earnings_gate`); the combiner applies it. The
//! component itself just answers the question.

use super::{ComponentSignal, SignalContext};

/// True when the latest earnings record shows a surprise above the
/// configured floor.
#[derive(Debug, Default)]
pub struct EarningsSignal;

impl ComponentSignal for EarningsSignal {
    fn name(&self) -> &str {
        "earnings"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> bool {
        let Some(record) = ctx.earnings else {
            return false;
        };
        record.surprise_pct > ctx.params.min_earnings_surprise
    }
}
