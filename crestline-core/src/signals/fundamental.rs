//! Fundamental growth gate.

use super::{ComponentSignal, SignalContext};

/// True when year-over-year EPS growth and revenue growth both exceed the
/// configured floors (zero by default). The forward-filled quarterly record
/// at the evaluation date supplies both figures.
#[derive(Debug, Default)]
pub struct FundamentalSignal;

impl ComponentSignal for FundamentalSignal {
    fn name(&self) -> &str {
        "fundamental"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> bool {
        let Some(record) = ctx.fundamental else {
            return false;
        };
        record.eps_growth_yoy > ctx.params.min_eps_growth
            && record.revenue_growth_yoy > ctx.params.min_revenue_growth
    }
}
