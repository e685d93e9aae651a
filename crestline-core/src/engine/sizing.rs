//! Position sizing: cash-at-risk divided by per-share risk, under caps.

use crate::config::SizingParams;

/// Whole-share quantity for a new entry, or None when no affordable size
/// survives the caps.
///
/// Base size is `equity * risk_per_trade / (entry - stop)`: the position
/// loses exactly the risk budget if the initial stop trades. Caps: single
/// position cost, total exposure after entry, and available cash.
pub fn size_entry(
    equity: f64,
    cash: f64,
    open_exposure: f64,
    entry_price: f64,
    stop_price: f64,
    params: &SizingParams,
) -> Option<f64> {
    if entry_price <= 0.0 || equity <= 0.0 {
        return None;
    }
    let per_share_risk = entry_price - stop_price;
    if per_share_risk <= 0.0 {
        return None;
    }

    let risk_budget = equity * params.risk_per_trade;
    let mut quantity = (risk_budget / per_share_risk).floor();

    let position_cap = (params.max_position_pct * equity / entry_price).floor();
    quantity = quantity.min(position_cap);

    let exposure_room = params.max_exposure_pct * equity - open_exposure;
    if exposure_room <= 0.0 {
        return None;
    }
    quantity = quantity.min((exposure_room / entry_price).floor());

    quantity = quantity.min((cash / entry_price).floor());

    (quantity >= 1.0).then_some(quantity)
}
