//! End-to-end engine tests over synthetic universes.

use chrono::{Datelike, NaiveDate};
use crestline_core::config::EngineSettings;
use crestline_core::domain::{
    resample_weekly, DateSeries, ExitReason, FundamentalRecord, PriceBar, RelativeStrengthRecord,
};
use crestline_core::engine::run_backtest;
use crestline_core::store::{InMemoryStore, MarketDataStore, StoreError};

fn weekday_dates(n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut d = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(); // a Monday
    while dates.len() < n {
        if d.weekday().number_from_monday() <= 5 {
            dates.push(d);
        }
        d = d.succ_opt().unwrap();
    }
    dates
}

fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    let dates = weekday_dates(closes.len());
    closes
        .iter()
        .zip(&dates)
        .map(|(&close, &date)| PriceBar {
            symbol: symbol.to_string(),
            date,
            open: close * 0.998,
            high: close * 1.005,
            low: close * 0.994,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

fn rs_records(dates: &[NaiveDate], rating: f64) -> DateSeries<RelativeStrengthRecord> {
    DateSeries::new(
        dates
            .iter()
            .map(|&date| RelativeStrengthRecord {
                date,
                rs_4w: rating,
                rs_12w: rating - 2.0,
                sector_rs: None,
                industry_rs: None,
            })
            .collect(),
    )
    .unwrap()
}

fn growth_fundamentals(first_date: NaiveDate) -> DateSeries<FundamentalRecord> {
    DateSeries::new(vec![FundamentalRecord {
        date: first_date,
        eps_growth_yoy: 0.35,
        revenue_growth_yoy: 0.22,
        market_cap: 8e9,
    }])
    .unwrap()
}

/// Gentle rise long enough to warm the weekly indicators, then a strong
/// advance.
fn growth_closes(total: usize, breakout_at: usize) -> Vec<f64> {
    let mut closes = Vec::with_capacity(total);
    let mut price = 100.0;
    for i in 0..total {
        price *= if i < breakout_at { 1.0008 } else { 1.02 };
        closes.push(price);
    }
    closes
}

fn store_for(symbol: &str, closes: &[f64]) -> InMemoryStore {
    let bars = bars_from_closes(symbol, closes);
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let daily = DateSeries::new(bars).unwrap();

    let mut store = InMemoryStore::new();
    store.insert_weekly(symbol, resample_weekly(&daily));
    store.insert_daily(symbol, daily);
    store.insert_relative_strength(symbol, rs_records(&dates, 95.0));
    store.insert_fundamentals(symbol, growth_fundamentals(dates[0]));
    store
}

#[test]
fn strong_symbol_enters_half_exits_and_closes_at_end() {
    let store = store_for("UP", &growth_closes(300, 260));
    let settings = EngineSettings::backtest(100_000.0);

    let result = run_backtest(&store, &settings).unwrap();

    assert_eq!(result.symbol_count, 1);
    assert_eq!(result.session_count, 300);
    assert_eq!(result.trades.len(), 1, "one round trip expected");

    let trade = &result.trades[0];
    assert_eq!(trade.reason, ExitReason::EndOfRun);
    assert!(trade.half_exited, "the +20% advance must trigger the half exit");
    assert!(trade.pnl > 0.0);
    assert!(result.final_equity > 100_000.0);
    assert_eq!(result.equity_curve.len(), 300);
}

#[test]
fn whipsaw_cooldown_blocks_reentry_for_configured_sessions() {
    let crash_idx = 280;
    let total = 296;
    let closes = growth_closes(total, 260);
    let dates = weekday_dates(total);

    let mut bars = bars_from_closes("UP", &closes);
    // Shakeout: an intraday plunge through any stop, closing back up.
    bars[crash_idx].low = 1.0;

    let daily = DateSeries::new(bars).unwrap();
    let mut store = InMemoryStore::new();
    store.insert_weekly("UP", resample_weekly(&daily));
    store.insert_daily("UP", daily);
    store.insert_relative_strength("UP", rs_records(&dates, 95.0));
    store.insert_fundamentals("UP", growth_fundamentals(dates[0]));

    let mut settings = EngineSettings::backtest(100_000.0);
    settings.risk.whipsaw_cooldown = 5;

    let result = run_backtest(&store, &settings).unwrap();

    assert!(result.trades.len() >= 2, "stop-out then re-entry expected");
    let stop_out = &result.trades[0];
    assert_eq!(stop_out.reason, ExitReason::StopLoss);
    assert_eq!(stop_out.exit_date, dates[crash_idx]);

    // Conditions stay favorable every day after the shakeout, so absent the
    // cooldown the engine would re-enter on d+1. It must wait out exactly
    // whipsaw_cooldown sessions and re-enter on the sixth.
    let reentry = &result.trades[1];
    assert_eq!(reentry.entry_date, dates[crash_idx + 6]);
}

#[test]
fn identical_inputs_produce_identical_results() {
    let store = store_for("UP", &growth_closes(300, 260));
    let settings = EngineSettings::backtest(100_000.0);

    let first = run_backtest(&store, &settings).unwrap();
    let second = run_backtest(&store, &settings).unwrap();

    let ledger_a = serde_json::to_string(&first.trades).unwrap();
    let ledger_b = serde_json::to_string(&second.trades).unwrap();
    assert_eq!(ledger_a, ledger_b);

    let curve_a = serde_json::to_string(&first.equity_curve).unwrap();
    let curve_b = serde_json::to_string(&second.equity_curve).unwrap();
    assert_eq!(curve_a, curve_b);
}

/// A store that fails one symbol's daily series: the run continues for the
/// rest of the universe.
struct HalfBrokenStore {
    inner: InMemoryStore,
}

impl MarketDataStore for HalfBrokenStore {
    fn symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut symbols = self.inner.symbols()?;
        symbols.push("BROKEN".to_string());
        symbols.sort();
        Ok(symbols)
    }

    fn daily_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        if symbol == "BROKEN" {
            return Err(StoreError::Other("backend connection reset".into()));
        }
        self.inner.daily_bars(symbol)
    }

    fn weekly_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        self.inner.weekly_bars(symbol)
    }

    fn relative_strength(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<RelativeStrengthRecord>>, StoreError> {
        self.inner.relative_strength(symbol)
    }

    fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<FundamentalRecord>>, StoreError> {
        self.inner.fundamentals(symbol)
    }
}

#[test]
fn collaborator_failure_skips_symbol_and_continues() {
    let store = HalfBrokenStore {
        inner: store_for("UP", &growth_closes(300, 260)),
    };
    let settings = EngineSettings::backtest(100_000.0);

    let result = run_backtest(&store, &settings).unwrap();

    assert_eq!(result.symbol_count, 1, "only the healthy symbol runs");
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("BROKEN") && w.contains("skipped")));
    assert_eq!(result.trades.len(), 1);
}

/// Backtest-mode signal evaluations at date t must be identical whether or
/// not bar t carries a sentinel value: nothing same-day leaks into the
/// daily/relative-strength families.
#[test]
fn backtest_evaluations_unaffected_by_sentinel_at_t() {
    let closes = growth_closes(300, 260);
    let run = |sentinel: bool| {
        let mut bars = bars_from_closes("UP", &closes);
        if sentinel {
            let last = bars.last_mut().unwrap();
            last.open = 50_000.0;
            last.high = 99_999.0;
            last.low = 40_000.0;
            last.close = 77_777.0;
            last.volume = 9e9;
        }
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let daily = DateSeries::new(bars).unwrap();
        let mut store = InMemoryStore::new();
        store.insert_weekly("UP", resample_weekly(&daily));
        store.insert_daily("UP", daily);
        store.insert_relative_strength("UP", rs_records(&dates, 95.0));
        // No fundamentals: entry never accepted, so the symbol stays
        // eligible and is evaluated on every date including the last.
        let mut settings = EngineSettings::backtest(100_000.0);
        settings.trace_signals = true;
        (run_backtest(&store, &settings).unwrap(), dates)
    };

    let (clean, dates) = run(false);
    let (poisoned, _) = run(true);
    let last_date = *dates.last().unwrap();

    // Only the daily-technical and relative-strength families are lagged in
    // backtest mode; weekly legitimately admits date t (its own cadence is
    // the lag), so the comparison covers the daily/RS-derived fields.
    let pick = |result: &crestline_core::engine::RunResult| {
        result
            .evaluations
            .iter()
            .find(|e| e.date == last_date)
            .expect("final-date evaluation traced")
            .clone()
    };

    let a = pick(&clean);
    let b = pick(&poisoned);
    assert_eq!(a.breakout, b.breakout);
    assert_eq!(a.relative_strength, b.relative_strength);
    assert_eq!(a.target_price, b.target_price);
    assert_eq!(a.stop_price, b.stop_price);
}

#[test]
fn invalid_config_is_fatal_before_any_date() {
    let store = store_for("UP", &growth_closes(60, 50));
    let mut settings = EngineSettings::backtest(100_000.0);
    settings.signal.weights.breakout = 0.9; // weights no longer sum to 1

    let err = run_backtest(&store, &settings).unwrap_err();
    assert!(err.to_string().contains("weights"));
}

#[test]
fn empty_universe_yields_empty_result() {
    let store = InMemoryStore::new();
    let settings = EngineSettings::backtest(100_000.0);
    let result = run_backtest(&store, &settings).unwrap();
    assert_eq!(result.session_count, 0);
    assert!(result.trades.is_empty());
    assert_eq!(result.final_equity, 100_000.0);
}
