//! Relative strength computed from price history.
//!
//! Used when the data store supplies no ready-made relative-strength series:
//! the raw measure is (symbol return over N bars) - (benchmark return over
//! the same span), and the raw spreads are then ranked cross-sectionally
//! across the run's universe into 1..=99 percentiles so the configured
//! threshold (default 90) means the same thing whether records were
//! supplied or derived.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{DateSeries, PriceBar, RelativeStrengthRecord};
use crate::timing::ObservationCutoff;

/// ~4 weeks of trading days.
pub const RS_SHORT_DAYS: usize = 20;
/// ~12 weeks of trading days.
pub const RS_MEDIUM_DAYS: usize = 60;
/// Smoothing window for the short-horizon value.
pub const RS_SMOOTHING_DAYS: usize = 5;

/// Raw return spreads for one symbol, aligned to its daily series.
#[derive(Debug, Clone)]
pub struct SpreadSeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub short: Vec<f64>,
    pub medium: Vec<f64>,
}

/// Compute short/medium return spreads versus a benchmark.
///
/// The benchmark is sampled at the latest benchmark date at or before each
/// endpoint, so calendars need not match exactly. Spans with insufficient
/// history on either side are NaN.
pub fn compute_spreads(
    symbol: &str,
    bars: &DateSeries<PriceBar>,
    benchmark: &DateSeries<PriceBar>,
) -> SpreadSeries {
    let n = bars.len();
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let short = spread_at_horizon(bars, benchmark, RS_SHORT_DAYS);
    let medium = spread_at_horizon(bars, benchmark, RS_MEDIUM_DAYS);
    debug_assert_eq!(short.len(), n);

    SpreadSeries {
        symbol: symbol.to_string(),
        dates,
        short,
        medium,
    }
}

fn spread_at_horizon(
    bars: &DateSeries<PriceBar>,
    benchmark: &DateSeries<PriceBar>,
    horizon: usize,
) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    for i in horizon..n {
        let curr = bars.get(i).unwrap();
        let base = bars.get(i - horizon).unwrap();
        if curr.close.is_nan() || base.close.is_nan() || base.close <= 0.0 {
            continue;
        }
        let symbol_return = curr.close / base.close - 1.0;

        let bench_return = match (
            benchmark_close_at(benchmark, curr.date),
            benchmark_close_at(benchmark, base.date),
        ) {
            (Some(end), Some(start)) if start > 0.0 => end / start - 1.0,
            _ => continue,
        };

        result[i] = symbol_return - bench_return;
    }

    result
}

fn benchmark_close_at(benchmark: &DateSeries<PriceBar>, date: NaiveDate) -> Option<f64> {
    let idx = benchmark.latest_admitted(ObservationCutoff::Through(date))?;
    let close = benchmark.get(idx)?.close;
    (!close.is_nan()).then_some(close)
}

/// Rank raw spreads cross-sectionally into 1..=99 percentile records.
///
/// For each date, every symbol with a finite spread is ranked against the
/// others; a lone symbol ranks 50. Records are emitted only once both
/// horizons are available for the symbol.
pub fn rank_universe(spreads: &[SpreadSeries]) -> HashMap<String, DateSeries<RelativeStrengthRecord>> {
    // date -> [(symbol index, value)]
    let mut short_by_date: BTreeMap<NaiveDate, Vec<(usize, f64)>> = BTreeMap::new();
    let mut medium_by_date: BTreeMap<NaiveDate, Vec<(usize, f64)>> = BTreeMap::new();

    for (sym_idx, series) in spreads.iter().enumerate() {
        for (i, &date) in series.dates.iter().enumerate() {
            if series.short[i].is_finite() {
                short_by_date.entry(date).or_default().push((sym_idx, series.short[i]));
            }
            if series.medium[i].is_finite() {
                medium_by_date.entry(date).or_default().push((sym_idx, series.medium[i]));
            }
        }
    }

    let short_ranks = percentile_ranks(&short_by_date);
    let medium_ranks = percentile_ranks(&medium_by_date);

    let mut out: HashMap<String, DateSeries<RelativeStrengthRecord>> = HashMap::new();
    for (sym_idx, series) in spreads.iter().enumerate() {
        let mut records = Vec::new();
        for &date in &series.dates {
            let (Some(&rs_4w), Some(&rs_12w)) = (
                short_ranks.get(&(date, sym_idx)),
                medium_ranks.get(&(date, sym_idx)),
            ) else {
                continue;
            };
            records.push(RelativeStrengthRecord {
                date,
                rs_4w,
                rs_12w,
                sector_rs: None,
                industry_rs: None,
            });
        }
        // Dates within one symbol are already unique and ascending.
        let series_out = DateSeries::new(records).expect("ranked records inherit date order");
        out.insert(series.symbol.clone(), series_out);
    }

    out
}

fn percentile_ranks(
    by_date: &BTreeMap<NaiveDate, Vec<(usize, f64)>>,
) -> HashMap<(NaiveDate, usize), f64> {
    let mut ranks = HashMap::new();
    for (&date, entries) in by_date {
        let m = entries.len();
        if m == 1 {
            ranks.insert((date, entries[0].0), 50.0);
            continue;
        }
        for &(sym_idx, value) in entries {
            let below = entries.iter().filter(|&&(_, v)| v < value).count();
            let pct = 1.0 + 98.0 * below as f64 / (m - 1) as f64;
            ranks.insert((date, sym_idx), pct);
        }
    }
    ranks
}
