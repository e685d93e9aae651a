//! Weekly signal: close near the 52-week high with the long trend intact.

use super::{ComponentSignal, SignalContext};

/// True when the weekly close sits within the configured proximity of the
/// rolling 52-week high, above its 40-week average, and that average is
/// still rising.
#[derive(Debug, Default)]
pub struct WeeklySignal;

impl ComponentSignal for WeeklySignal {
    fn name(&self) -> &str {
        "weekly"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> bool {
        let Some(weekly) = ctx.weekly else {
            return false;
        };
        let (Some(pct), Some(close), Some(sma), Some(momentum)) = (
            weekly.pct_of_52w_high,
            weekly.close,
            weekly.sma_40w,
            weekly.sma_40w_momentum,
        ) else {
            return false;
        };

        pct >= 1.0 - ctx.params.weekly_proximity && close > sma && momentum > 0.0
    }
}
