//! Data-store collaborator boundary.
//!
//! The engine never touches persistence. A `MarketDataStore` hands over
//! ascending, unique-dated series per symbol; where it got them (CSV,
//! database, network) is its own business. A failure for one symbol is
//! logged and survived; only a failure to enumerate the universe stops a
//! run before it starts.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{
    DateSeries, EarningsRecord, FundamentalRecord, PriceBar, RelativeStrengthRecord, SeriesError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("{series} series unavailable for {symbol}")]
    SeriesUnavailable {
        symbol: String,
        series: &'static str,
    },

    #[error("malformed series for {symbol}: {source}")]
    Malformed {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("store error: {0}")]
    Other(String),
}

/// Read-only access to per-symbol input series.
///
/// `relative_strength`, `fundamentals` and `earnings` return `Ok(None)`
/// when the store simply has nothing for the symbol; that is not an error,
/// the dependent signals just evaluate false (or, for relative strength,
/// the engine derives a series from the benchmark when one is available).
pub trait MarketDataStore: Send + Sync {
    fn symbols(&self) -> Result<Vec<String>, StoreError>;

    fn daily_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError>;

    fn weekly_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError>;

    fn relative_strength(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<RelativeStrengthRecord>>, StoreError> {
        let _ = symbol;
        Ok(None)
    }

    fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<FundamentalRecord>>, StoreError> {
        let _ = symbol;
        Ok(None)
    }

    fn earnings(&self, symbol: &str) -> Result<Option<DateSeries<EarningsRecord>>, StoreError> {
        let _ = symbol;
        Ok(None)
    }

    /// Benchmark daily series for derived relative strength, if the store
    /// designates one.
    fn benchmark(&self) -> Result<Option<DateSeries<PriceBar>>, StoreError> {
        Ok(None)
    }
}

/// In-memory store for tests and synthetic runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    daily: HashMap<String, DateSeries<PriceBar>>,
    weekly: HashMap<String, DateSeries<PriceBar>>,
    relative_strength: HashMap<String, DateSeries<RelativeStrengthRecord>>,
    fundamentals: HashMap<String, DateSeries<FundamentalRecord>>,
    earnings: HashMap<String, DateSeries<EarningsRecord>>,
    benchmark: Option<DateSeries<PriceBar>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_daily(&mut self, symbol: &str, series: DateSeries<PriceBar>) {
        self.daily.insert(symbol.to_string(), series);
    }

    pub fn insert_weekly(&mut self, symbol: &str, series: DateSeries<PriceBar>) {
        self.weekly.insert(symbol.to_string(), series);
    }

    pub fn insert_relative_strength(
        &mut self,
        symbol: &str,
        series: DateSeries<RelativeStrengthRecord>,
    ) {
        self.relative_strength.insert(symbol.to_string(), series);
    }

    pub fn insert_fundamentals(&mut self, symbol: &str, series: DateSeries<FundamentalRecord>) {
        self.fundamentals.insert(symbol.to_string(), series);
    }

    pub fn insert_earnings(&mut self, symbol: &str, series: DateSeries<EarningsRecord>) {
        self.earnings.insert(symbol.to_string(), series);
    }

    pub fn set_benchmark(&mut self, series: DateSeries<PriceBar>) {
        self.benchmark = Some(series);
    }
}

impl MarketDataStore for InMemoryStore {
    fn symbols(&self) -> Result<Vec<String>, StoreError> {
        let mut symbols: Vec<String> = self.daily.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn daily_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        self.daily
            .get(symbol)
            .cloned()
            .ok_or_else(|| StoreError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn weekly_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        self.weekly
            .get(symbol)
            .cloned()
            .ok_or_else(|| StoreError::SeriesUnavailable {
                symbol: symbol.to_string(),
                series: "weekly",
            })
    }

    fn relative_strength(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<RelativeStrengthRecord>>, StoreError> {
        Ok(self.relative_strength.get(symbol).cloned())
    }

    fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<FundamentalRecord>>, StoreError> {
        Ok(self.fundamentals.get(symbol).cloned())
    }

    fn earnings(&self, symbol: &str) -> Result<Option<DateSeries<EarningsRecord>>, StoreError> {
        Ok(self.earnings.get(symbol).cloned())
    }

    fn benchmark(&self) -> Result<Option<DateSeries<PriceBar>>, StoreError> {
        Ok(self.benchmark.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn symbols_sorted() {
        let mut store = InMemoryStore::new();
        store.insert_daily("ZETA", DateSeries::new(make_bars(&[1.0])).unwrap());
        store.insert_daily("ACME", DateSeries::new(make_bars(&[1.0])).unwrap());
        assert_eq!(store.symbols().unwrap(), vec!["ACME", "ZETA"]);
    }

    #[test]
    fn missing_daily_is_symbol_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.daily_bars("GONE"),
            Err(StoreError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn optional_series_default_to_none() {
        let mut store = InMemoryStore::new();
        store.insert_daily("ACME", DateSeries::new(make_bars(&[1.0])).unwrap());
        assert!(store.relative_strength("ACME").unwrap().is_none());
        assert!(store.fundamentals("ACME").unwrap().is_none());
        assert!(store.benchmark().unwrap().is_none());
    }
}
