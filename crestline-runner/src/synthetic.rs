//! Seeded synthetic universes for smoke tests and the demo path.
//!
//! Generates a benchmark plus a mix of strong and weak random-walk symbols
//! with quarterly fundamentals and earnings. No relative-strength records
//! are written, so runs over synthetic data exercise the derived-RS
//! (universe ranking) path end to end.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crestline_core::domain::{
    resample_weekly, DateSeries, EarningsRecord, FundamentalRecord, PriceBar,
};
use crestline_core::store::InMemoryStore;

/// Sessions per simulated quarter.
const QUARTER_SESSIONS: usize = 63;

/// Build a seeded in-memory universe: `symbol_count` tradable symbols plus
/// a benchmark. Identical seeds produce identical stores.
pub fn synthetic_store(symbol_count: usize, sessions: usize, seed: u64) -> InMemoryStore {
    let dates = trading_dates(sessions);
    let mut store = InMemoryStore::new();

    let mut rng = StdRng::seed_from_u64(seed);
    let benchmark = random_walk("BENCH", &dates, 0.0003, 0.010, &mut rng);
    store.set_benchmark(benchmark);

    for i in 0..symbol_count {
        let symbol = format!("SYM{:02}", i + 1);
        // Roughly a third of the universe trends strongly; the rest drifts.
        let strong = i % 3 == 0;
        let drift = if strong { 0.0018 } else { 0.0001 };
        let vol = if strong { 0.014 } else { 0.018 };

        let daily = random_walk(&symbol, &dates, drift, vol, &mut rng);
        store.insert_weekly(&symbol, resample_weekly(&daily));
        store.insert_daily(&symbol, daily);
        store.insert_fundamentals(&symbol, quarterly_fundamentals(&dates, strong, &mut rng));
        store.insert_earnings(&symbol, quarterly_earnings(&dates, strong, &mut rng));
    }

    store
}

/// Weekday calendar starting 2019-01-07.
pub fn trading_dates(sessions: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(sessions);
    let mut d = NaiveDate::from_ymd_opt(2019, 1, 7).unwrap();
    while dates.len() < sessions {
        if d.weekday().number_from_monday() <= 5 {
            dates.push(d);
        }
        d = d.succ_opt().unwrap();
    }
    dates
}

fn random_walk(
    symbol: &str,
    dates: &[NaiveDate],
    drift: f64,
    vol: f64,
    rng: &mut StdRng,
) -> DateSeries<PriceBar> {
    let mut price: f64 = rng.gen_range(20.0..200.0);
    let bars = dates
        .iter()
        .map(|&date| {
            let shock: f64 = rng.gen_range(-1.0..1.0);
            price = (price * (1.0 + drift + vol * shock)).max(1.0);
            let close = price;
            let open = close * (1.0 + rng.gen_range(-0.004..0.004));
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.006));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.006));
            let volume = rng.gen_range(200_000.0..2_000_000.0_f64).round();
            PriceBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect();
    DateSeries::new(bars).expect("generated dates ascend")
}

fn quarterly_fundamentals(
    dates: &[NaiveDate],
    strong: bool,
    rng: &mut StdRng,
) -> DateSeries<FundamentalRecord> {
    let records = dates
        .iter()
        .step_by(QUARTER_SESSIONS)
        .map(|&date| {
            let base = if strong { 0.20 } else { -0.05 };
            FundamentalRecord {
                date,
                eps_growth_yoy: base + rng.gen_range(-0.05..0.10),
                revenue_growth_yoy: base / 2.0 + rng.gen_range(-0.03..0.08),
                market_cap: rng.gen_range(5e8..5e10),
            }
        })
        .collect();
    DateSeries::new(records).expect("quarterly dates ascend")
}

fn quarterly_earnings(
    dates: &[NaiveDate],
    strong: bool,
    rng: &mut StdRng,
) -> DateSeries<EarningsRecord> {
    let records = dates
        .iter()
        .step_by(QUARTER_SESSIONS)
        .map(|&date| {
            let base = if strong { 0.04 } else { -0.02 };
            EarningsRecord {
                date,
                surprise_pct: base + rng.gen_range(-0.03..0.03),
                eps_growth_yoy: base * 5.0 + rng.gen_range(-0.05..0.05),
            }
        })
        .collect();
    DateSeries::new(records).expect("quarterly dates ascend")
}
