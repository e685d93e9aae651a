//! The backtest execution loop.
//!
//! Chronological over the union calendar of all symbols' daily dates. Each
//! date is a fan-out / fan-in: per-symbol risk decisions and signal
//! evaluations are computed on a worker pool (no symbol shares state with
//! another), then applied serially in a deterministic order behind the
//! date barrier, because position sizing depends on shared remaining cash.
//! Dates are never parallelized.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::config::{ConfigError, EngineSettings};
use crate::domain::{EquityPoint, ExitReason, Position};
use crate::indicators::relative_strength::{compute_spreads, rank_universe};
use crate::indicators::{SymbolFrame, SymbolIndicators};
use crate::risk::{apply_decision, RiskDecision, RiskManager};
use crate::signals::{SignalCombiner, SignalContext};
use crate::store::{MarketDataStore, StoreError};
use crate::timing::{SeriesFamily, TimingPolicy};

use super::sizing::size_entry;
use super::state::{EngineState, RunResult};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data store failed to enumerate symbols: {0}")]
    Store(#[from] StoreError),
}

/// Run a full backtest (or live re-evaluation) over the store's universe.
pub fn run_backtest(
    store: &dyn MarketDataStore,
    settings: &EngineSettings,
) -> Result<RunResult, EngineError> {
    settings.validate()?;
    let policy = TimingPolicy::new(settings.mode);
    let mut state = EngineState::new(settings.initial_cash);

    let frames = load_frames(store, &mut state.warnings)?;
    let indicators = build_indicators(frames, &mut state.warnings);
    let calendar: Vec<NaiveDate> = indicators
        .values()
        .flat_map(|ind| ind.frame().daily.iter().map(|b| b.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut symbols: Vec<String> = indicators.keys().cloned().collect();
    symbols.sort();

    let manager = RiskManager::new(settings.risk);
    let combiner = SignalCombiner::new();

    for (idx, &date) in calendar.iter().enumerate() {
        manage_open_positions(&mut state, &indicators, &manager, date, idx, settings);
        evaluate_entries(
            &mut state,
            &indicators,
            &symbols,
            &combiner,
            &manager,
            &policy,
            settings,
            date,
            idx,
        );

        let marks = mark_prices(&state, &indicators, date);
        let equity = state.portfolio.equity(&marks);
        state.equity_curve.push(EquityPoint { date, value: equity });
    }

    close_remaining(&mut state, &indicators, calendar.last().copied());

    let final_equity = state
        .equity_curve
        .last()
        .map(|p| p.value)
        .unwrap_or(settings.initial_cash);

    Ok(RunResult {
        equity_curve: state.equity_curve,
        trades: state.trades,
        evaluations: state.evaluations,
        warnings: state.warnings,
        session_count: calendar.len(),
        symbol_count: symbols.len(),
        final_equity,
    })
}

/// Load every symbol's frame; a failed symbol is logged and dropped, a
/// failed optional series is logged and treated as absent.
fn load_frames(
    store: &dyn MarketDataStore,
    warnings: &mut Vec<String>,
) -> Result<Vec<SymbolFrame>, EngineError> {
    let mut symbols = store.symbols()?;
    symbols.sort();
    symbols.dedup();

    let mut frames = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let daily = match store.daily_bars(&symbol) {
            Ok(series) => series,
            Err(err) => {
                warn!(%symbol, %err, "daily series unavailable, symbol skipped");
                warnings.push(format!("{symbol}: skipped ({err})"));
                continue;
            }
        };

        let weekly = match store.weekly_bars(&symbol) {
            Ok(series) => series,
            Err(err) => {
                warn!(%symbol, %err, "weekly series unavailable");
                warnings.push(format!("{symbol}: weekly series unavailable ({err})"));
                crate::domain::DateSeries::empty()
            }
        };

        let relative_strength = optional_series(store.relative_strength(&symbol), &symbol, warnings);
        let fundamentals = optional_series(store.fundamentals(&symbol), &symbol, warnings);
        let earnings = optional_series(store.earnings(&symbol), &symbol, warnings);

        frames.push(SymbolFrame {
            symbol,
            daily,
            weekly,
            relative_strength,
            fundamentals,
            earnings,
        });
    }

    derive_missing_relative_strength(store, &mut frames, warnings);
    Ok(frames)
}

fn optional_series<T>(
    result: Result<Option<T>, StoreError>,
    symbol: &str,
    warnings: &mut Vec<String>,
) -> Option<T> {
    match result {
        Ok(series) => series,
        Err(err) => {
            warn!(%symbol, %err, "optional series load failed");
            warnings.push(format!("{symbol}: series load failed ({err})"));
            None
        }
    }
}

/// Rank return spreads versus the benchmark for symbols the store gave no
/// relative-strength series.
fn derive_missing_relative_strength(
    store: &dyn MarketDataStore,
    frames: &mut [SymbolFrame],
    warnings: &mut Vec<String>,
) {
    if frames.iter().all(|f| f.relative_strength.is_some()) {
        return;
    }
    let benchmark = match store.benchmark() {
        Ok(Some(series)) => series,
        Ok(None) => return,
        Err(err) => {
            warn!(%err, "benchmark load failed, derived relative strength disabled");
            warnings.push(format!("benchmark load failed ({err})"));
            return;
        }
    };

    let spreads: Vec<_> = frames
        .iter()
        .filter(|f| f.relative_strength.is_none())
        .map(|f| compute_spreads(&f.symbol, &f.daily, &benchmark))
        .collect();
    let mut ranked = rank_universe(&spreads);

    for frame in frames.iter_mut() {
        if frame.relative_strength.is_none() {
            frame.relative_strength = ranked.remove(&frame.symbol);
        }
    }
}

fn build_indicators(
    frames: Vec<SymbolFrame>,
    warnings: &mut Vec<String>,
) -> HashMap<String, SymbolIndicators> {
    let built: Vec<SymbolIndicators> = frames
        .into_par_iter()
        .map(SymbolIndicators::build)
        .collect();

    let mut map = HashMap::new();
    for ind in built {
        let flagged = ind.flagged_bar_count();
        if flagged > 0 {
            warnings.push(format!(
                "{}: {flagged} bar(s) failed data-quality checks and were excluded",
                ind.symbol()
            ));
        }
        map.insert(ind.symbol().to_string(), ind);
    }
    map
}

/// Phase 1: risk decisions for all open positions, fan-out then serial
/// apply in sorted-symbol order.
fn manage_open_positions(
    state: &mut EngineState,
    indicators: &HashMap<String, SymbolIndicators>,
    manager: &RiskManager,
    date: NaiveDate,
    calendar_index: usize,
    settings: &EngineSettings,
) {
    let open_symbols = state.portfolio.open_symbols();
    if open_symbols.is_empty() {
        return;
    }

    let decisions: Vec<(String, RiskDecision)> = open_symbols
        .par_iter()
        .filter_map(|symbol| {
            // Missing or flagged bar: the symbol is skipped for the date.
            let bar = indicators.get(symbol)?.tradable_bar_on(date)?;
            let position = state.portfolio.position(symbol)?;
            Some((symbol.clone(), manager.evaluate(position, bar)))
        })
        .collect();

    for (symbol, decision) in decisions {
        let Some(position) = state.portfolio.position_mut(&symbol) else {
            continue;
        };
        let applied = apply_decision(position, &decision, date);
        state.portfolio.cash += applied.cash_delta;

        if let Some(trade) = applied.trade {
            if trade.reason == ExitReason::StopLoss {
                // Whipsaw guard: no re-entry for the next cooldown sessions.
                state.cooldown_until.insert(
                    symbol.clone(),
                    calendar_index + settings.risk.whipsaw_cooldown + 1,
                );
            }
            state.trades.push(trade);
            state.portfolio.positions.remove(&symbol);
        }
    }
}

/// Phase 2: combiner fan-out over eligible symbols, serial entry
/// application ranked by signal strength.
#[allow(clippy::too_many_arguments)]
fn evaluate_entries(
    state: &mut EngineState,
    indicators: &HashMap<String, SymbolIndicators>,
    symbols: &[String],
    combiner: &SignalCombiner,
    manager: &RiskManager,
    policy: &TimingPolicy,
    settings: &EngineSettings,
    date: NaiveDate,
    calendar_index: usize,
) {
    let eligible: Vec<&String> = symbols
        .iter()
        .filter(|s| {
            !state.portfolio.has_position(s)
                && !state.cooling_down(s, calendar_index)
                && indicators[s.as_str()].tradable_bar_on(date).is_some()
        })
        .collect();
    if eligible.is_empty() {
        return;
    }

    let mut evaluations: Vec<crate::domain::SignalEvaluation> = eligible
        .par_iter()
        .map(|&symbol| {
            let ind = &indicators[symbol.as_str()];
            let daily = ind.daily_snapshot(policy, date);
            let weekly = ind.weekly_snapshot(policy, date);
            let rs = ind.relative_strength_at(policy, date);
            let ctx = SignalContext {
                symbol: symbol.as_str(),
                date,
                daily: daily.as_ref(),
                weekly: weekly.as_ref(),
                rs: rs.as_ref(),
                fundamental: ind.fundamental_at(policy, date),
                earnings: ind.earnings_at(policy, date),
                params: &settings.signal,
            };
            combiner.evaluate(&ctx)
        })
        .collect();

    if settings.trace_signals {
        state.evaluations.extend(evaluations.iter().cloned());
    }

    // Strongest candidates claim the risk budget first; symbol breaks ties
    // so reruns are bit-identical.
    evaluations.retain(|e| e.entry);
    evaluations.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    // Sizing marks exclude anything the policy would withhold today.
    let sizing_marks = {
        let mut marks = HashMap::new();
        for symbol in state.portfolio.open_symbols() {
            let cutoff = policy.cutoff(SeriesFamily::DailyTechnical, date);
            if let Some(mark) = indicators[symbol.as_str()].mark_price(cutoff) {
                marks.insert(symbol, mark);
            }
        }
        marks
    };
    let sizing_equity = state.portfolio.equity(&sizing_marks);
    let mut open_exposure = state.portfolio.exposure(&sizing_marks);

    for evaluation in evaluations {
        let ind = &indicators[evaluation.symbol.as_str()];
        let Some(bar) = ind.tradable_bar_on(date) else {
            continue;
        };

        // Entries fill at the session open: the first price available
        // after a decision made before the session.
        let fill_price = bar.open;
        let initial_stop = manager.initial_stop(fill_price);
        let Some(quantity) = size_entry(
            sizing_equity,
            state.portfolio.cash,
            open_exposure,
            fill_price,
            initial_stop,
            &settings.sizing,
        ) else {
            continue;
        };

        state.portfolio.cash -= quantity * fill_price;
        open_exposure += quantity * fill_price;
        state.portfolio.positions.insert(
            evaluation.symbol.clone(),
            Position::open(
                evaluation.symbol.clone(),
                date,
                fill_price,
                quantity,
                initial_stop,
                evaluation.target_price,
            ),
        );
    }
}

fn mark_prices(
    state: &EngineState,
    indicators: &HashMap<String, SymbolIndicators>,
    date: NaiveDate,
) -> HashMap<String, f64> {
    let mut marks = HashMap::new();
    for symbol in state.portfolio.open_symbols() {
        let cutoff = crate::timing::ObservationCutoff::Through(date);
        if let Some(mark) = indicators[symbol.as_str()].mark_price(cutoff) {
            marks.insert(symbol, mark);
        }
    }
    marks
}

/// Force-close whatever is still open at the final session so the ledger
/// accounts for every position.
fn close_remaining(
    state: &mut EngineState,
    indicators: &HashMap<String, SymbolIndicators>,
    last_date: Option<NaiveDate>,
) {
    let Some(date) = last_date else {
        return;
    };
    for symbol in state.portfolio.open_symbols() {
        let Some(position) = state.portfolio.position_mut(&symbol) else {
            continue;
        };
        let cutoff = crate::timing::ObservationCutoff::Through(date);
        let price = indicators[symbol.as_str()]
            .mark_price(cutoff)
            .unwrap_or(position.entry_price);

        let decision = RiskDecision {
            exit: Some((price, ExitReason::EndOfRun)),
            half_exit_price: None,
            profit_units: position.profit_units,
            proposed_stop: position.stop_price,
        };
        let applied = apply_decision(position, &decision, date);
        state.portfolio.cash += applied.cash_delta;
        if let Some(trade) = applied.trade {
            state.trades.push(trade);
        }
        state.portfolio.positions.remove(&symbol);
    }
}
