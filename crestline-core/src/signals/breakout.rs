//! Daily breakout with relative-strength confirmation.

use super::{ComponentSignal, SignalContext};

/// True when the daily high clears the prior rolling high for any one of
/// the configured lookback horizons, and the short-horizon relative
/// strength is at or above the threshold on the same evaluation date.
///
/// Horizons are unioned: one firing horizon qualifies. The RS requirement
/// applies regardless of which horizon fired.
#[derive(Debug, Default)]
pub struct BreakoutSignal;

impl ComponentSignal for BreakoutSignal {
    fn name(&self) -> &str {
        "breakout"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> bool {
        let Some(daily) = ctx.daily else {
            return false;
        };
        let Some(high) = daily.high else {
            return false;
        };

        let broke_out = ctx.params.horizons.iter().any(|horizon| {
            matches!(daily.prior_highest[horizon.slot()], Some(level) if high > level)
        });
        if !broke_out {
            return false;
        }

        ctx.rs
            .is_some_and(|rs| rs.rs_4w >= ctx.params.rs_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakoutHorizon, SignalParams};
    use crate::indicators::calculator::RsView;
    use crate::indicators::DailySnapshot;
    use crate::signals::test_support::*;

    fn ctx<'a>(
        daily: Option<&'a DailySnapshot>,
        rs: Option<&'a RsView>,
        params: &'a SignalParams,
    ) -> SignalContext<'a> {
        SignalContext {
            symbol: "ACME",
            date: date(),
            daily,
            weekly: None,
            rs,
            fundamental: None,
            earnings: None,
            params,
        }
    }

    #[test]
    fn fires_on_breakout_with_strong_rs() {
        let params = SignalParams::default();
        let daily = strong_daily();
        let rs = strong_rs();
        assert!(BreakoutSignal.evaluate(&ctx(Some(&daily), Some(&rs), &params)));
    }

    #[test]
    fn one_firing_horizon_is_enough() {
        let mut params = SignalParams::default();
        params.horizons = vec![BreakoutHorizon::TwoYears];
        let mut daily = strong_daily();
        // Only the 2-year window is below today's high.
        daily.prior_highest = [Some(200.0), Some(200.0), Some(200.0), Some(200.0), Some(149.0)];
        let rs = strong_rs();
        assert!(BreakoutSignal.evaluate(&ctx(Some(&daily), Some(&rs), &params)));
    }

    #[test]
    fn rejects_without_rs_confirmation() {
        let params = SignalParams::default();
        let daily = strong_daily();
        let mut rs = strong_rs();
        rs.rs_4w = 70.0; // below the 90 threshold
        assert!(!BreakoutSignal.evaluate(&ctx(Some(&daily), Some(&rs), &params)));
    }

    #[test]
    fn rejects_with_no_breakout() {
        let params = SignalParams::default();
        let mut daily = strong_daily();
        daily.prior_highest = [Some(200.0); 5];
        let rs = strong_rs();
        assert!(!BreakoutSignal.evaluate(&ctx(Some(&daily), Some(&rs), &params)));
    }

    #[test]
    fn rs_required_even_when_horizon_fires() {
        let params = SignalParams::default();
        let daily = strong_daily();
        assert!(!BreakoutSignal.evaluate(&ctx(Some(&daily), None, &params)));
    }

    #[test]
    fn warmup_horizon_does_not_fire() {
        let mut params = SignalParams::default();
        params.horizons = vec![BreakoutHorizon::TwoYears];
        let mut daily = strong_daily();
        daily.prior_highest = [Some(100.0), Some(100.0), Some(100.0), Some(100.0), None];
        let rs = strong_rs();
        assert!(!BreakoutSignal.evaluate(&ctx(Some(&daily), Some(&rs), &params)));
    }
}
