//! Conjunction of the component signals into a single entry decision.

use crate::domain::SignalEvaluation;

use super::{
    BreakoutSignal, ComponentSignal, EarningsSignal, FundamentalSignal, RelativeStrengthSignal,
    SignalContext, WeeklySignal,
};

/// Evaluates all five families and combines them.
///
/// Required for entry: weekly AND breakout AND relative-strength AND
/// fundamental. The earnings component joins the conjunction only when
/// `earnings_gate` is set; otherwise it is carried on the evaluation for
/// logging and ranking.
#[derive(Debug, Default)]
pub struct SignalCombiner {
    weekly: WeeklySignal,
    breakout: BreakoutSignal,
    relative_strength: RelativeStrengthSignal,
    fundamental: FundamentalSignal,
    earnings: EarningsSignal,
}

impl SignalCombiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, ctx: &SignalContext<'_>) -> SignalEvaluation {
        let weekly = self.weekly.evaluate(ctx);
        let breakout = self.breakout.evaluate(ctx);
        let relative_strength = self.relative_strength.evaluate(ctx);
        let fundamental = self.fundamental.evaluate(ctx);
        let earnings = self.earnings.evaluate(ctx);

        let mut entry = weekly && breakout && relative_strength && fundamental;
        if ctx.params.earnings_gate {
            entry = entry && earnings;
        }

        let score = |hit: bool| if hit { 1.0 } else { 0.0 };
        let weights = &ctx.params.weights;
        let strength = weights.weekly * score(weekly)
            + weights.breakout * score(breakout)
            + weights.relative_strength * score(relative_strength)
            + weights.fundamental * score(fundamental)
            + weights.earnings * score(earnings);

        // Target and stop derive from the last admitted close and ADR, so
        // the evaluation stays clean under the backtest cutoff.
        let (target_price, stop_price) = match ctx.daily {
            Some(daily) => match (daily.close, daily.adr) {
                (Some(close), Some(adr)) => (
                    Some(close + ctx.params.target_adr_mult * adr),
                    Some(close - ctx.params.stop_adr_mult * adr),
                ),
                _ => (None, None),
            },
            None => (None, None),
        };

        SignalEvaluation {
            symbol: ctx.symbol.to_string(),
            date: ctx.date,
            weekly,
            breakout,
            relative_strength,
            fundamental,
            earnings,
            entry,
            strength,
            target_price,
            stop_price,
        }
    }
}
