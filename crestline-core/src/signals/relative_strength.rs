//! Standalone relative-strength gate.

use super::{ComponentSignal, SignalContext};

/// True when the short-horizon relative-strength rating alone clears the
/// threshold, independent of any price breakout.
#[derive(Debug, Default)]
pub struct RelativeStrengthSignal;

impl ComponentSignal for RelativeStrengthSignal {
    fn name(&self) -> &str {
        "relative_strength"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> bool {
        ctx.rs
            .is_some_and(|rs| rs.rs_4w >= ctx.params.rs_threshold)
    }
}
