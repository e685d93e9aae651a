//! CSV-backed data store.
//!
//! Layout: one `<SYMBOL>.csv` of daily bars per symbol, with optional
//! sidecar files per series:
//!
//! - `<SYMBOL>.weekly.csv`       weekly bars (resampled from daily if absent)
//! - `<SYMBOL>.rs.csv`           relative-strength records
//! - `<SYMBOL>.fundamentals.csv` quarterly fundamentals
//! - `<SYMBOL>.earnings.csv`     quarterly earnings
//!
//! Sidecar stems contain a dot, so only plain stems enumerate as symbols.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crestline_core::domain::{
    resample_weekly, DateSeries, Dated, EarningsRecord, FundamentalRecord, PriceBar,
    RelativeStrengthRecord,
};
use crestline_core::store::{MarketDataStore, StoreError};

#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
    benchmark: Option<String>,
}

impl CsvStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            benchmark: None,
        }
    }

    /// Designate one symbol's daily file as the benchmark for derived
    /// relative strength.
    pub fn with_benchmark(mut self, symbol: &str) -> Self {
        self.benchmark = Some(symbol.to_string());
        self
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    fn read_rows<Row: for<'de> Deserialize<'de>>(
        &self,
        path: &Path,
        symbol: &str,
    ) -> Result<Vec<Row>, StoreError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| StoreError::Other(format!("{symbol}: {e}")))?;
        reader
            .deserialize()
            .collect::<Result<Vec<Row>, _>>()
            .map_err(|e| StoreError::Other(format!("{symbol}: {e}")))
    }

    fn series_from_rows<Row, T>(
        &self,
        rows: Vec<Row>,
        symbol: &str,
        convert: impl Fn(Row) -> T,
    ) -> Result<DateSeries<T>, StoreError>
    where
        T: Dated,
    {
        DateSeries::new(rows.into_iter().map(convert).collect()).map_err(|source| {
            StoreError::Malformed {
                symbol: symbol.to_string(),
                source,
            }
        })
    }

    fn bars_from(&self, path: &Path, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        let rows: Vec<BarRow> = self.read_rows(path, symbol)?;
        self.series_from_rows(rows, symbol, |row| PriceBar {
            symbol: symbol.to_string(),
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BarRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct RsRow {
    date: NaiveDate,
    rs_4w: f64,
    rs_12w: f64,
    sector_rs: Option<f64>,
    industry_rs: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FundamentalRow {
    date: NaiveDate,
    eps_growth_yoy: f64,
    revenue_growth_yoy: f64,
    market_cap: f64,
}

#[derive(Debug, Deserialize)]
struct EarningsRow {
    date: NaiveDate,
    surprise_pct: f64,
    eps_growth_yoy: f64,
}

impl MarketDataStore for CsvStore {
    fn symbols(&self) -> Result<Vec<String>, StoreError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| StoreError::Other(format!("cannot list {}: {e}", self.dir.display())))?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::Other(e.to_string()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.contains('.') {
                continue; // sidecar file
            }
            if self.benchmark.as_deref() == Some(stem) {
                continue; // the benchmark is not a tradable universe member
            }
            symbols.push(stem.to_string());
        }
        symbols.sort();
        Ok(symbols)
    }

    fn daily_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(StoreError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        self.bars_from(&path, symbol)
    }

    fn weekly_bars(&self, symbol: &str) -> Result<DateSeries<PriceBar>, StoreError> {
        let path = self.path_for(&format!("{symbol}.weekly"));
        if path.exists() {
            self.bars_from(&path, symbol)
        } else {
            Ok(resample_weekly(&self.daily_bars(symbol)?))
        }
    }

    fn relative_strength(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<RelativeStrengthRecord>>, StoreError> {
        let path = self.path_for(&format!("{symbol}.rs"));
        if !path.exists() {
            return Ok(None);
        }
        let rows: Vec<RsRow> = self.read_rows(&path, symbol)?;
        self.series_from_rows(rows, symbol, |row| RelativeStrengthRecord {
            date: row.date,
            rs_4w: row.rs_4w,
            rs_12w: row.rs_12w,
            sector_rs: row.sector_rs,
            industry_rs: row.industry_rs,
        })
        .map(Some)
    }

    fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<DateSeries<FundamentalRecord>>, StoreError> {
        let path = self.path_for(&format!("{symbol}.fundamentals"));
        if !path.exists() {
            return Ok(None);
        }
        let rows: Vec<FundamentalRow> = self.read_rows(&path, symbol)?;
        self.series_from_rows(rows, symbol, |row| FundamentalRecord {
            date: row.date,
            eps_growth_yoy: row.eps_growth_yoy,
            revenue_growth_yoy: row.revenue_growth_yoy,
            market_cap: row.market_cap,
        })
        .map(Some)
    }

    fn earnings(&self, symbol: &str) -> Result<Option<DateSeries<EarningsRecord>>, StoreError> {
        let path = self.path_for(&format!("{symbol}.earnings"));
        if !path.exists() {
            return Ok(None);
        }
        let rows: Vec<EarningsRow> = self.read_rows(&path, symbol)?;
        self.series_from_rows(rows, symbol, |row| EarningsRecord {
            date: row.date,
            surprise_pct: row.surprise_pct,
            eps_growth_yoy: row.eps_growth_yoy,
        })
        .map(Some)
    }

    fn benchmark(&self) -> Result<Option<DateSeries<PriceBar>>, StoreError> {
        match &self.benchmark {
            Some(symbol) => {
                let path = self.path_for(symbol);
                if !path.exists() {
                    return Err(StoreError::SymbolNotFound {
                        symbol: symbol.clone(),
                    });
                }
                self.bars_from(&path, symbol).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_daily(dir: &Path, symbol: &str, rows: &[(&str, f64)]) {
        let mut out = String::from("date,open,high,low,close,volume\n");
        for (date, close) in rows {
            out.push_str(&format!(
                "{date},{o},{h},{l},{close},100000\n",
                o = close - 0.4,
                h = close + 1.0,
                l = close - 1.0,
            ));
        }
        fs::write(dir.join(format!("{symbol}.csv")), out).unwrap();
    }

    #[test]
    fn lists_symbols_excluding_sidecars_and_benchmark() {
        let dir = tempfile::tempdir().unwrap();
        write_daily(dir.path(), "ACME", &[("2024-01-02", 100.0)]);
        write_daily(dir.path(), "ZETA", &[("2024-01-02", 50.0)]);
        write_daily(dir.path(), "BENCH", &[("2024-01-02", 400.0)]);
        fs::write(dir.path().join("ACME.rs.csv"), "date,rs_4w,rs_12w,sector_rs,industry_rs\n")
            .unwrap();

        let store = CsvStore::open(dir.path()).with_benchmark("BENCH");
        assert_eq!(store.symbols().unwrap(), vec!["ACME", "ZETA"]);
    }

    #[test]
    fn parses_daily_and_resamples_weekly() {
        let dir = tempfile::tempdir().unwrap();
        write_daily(
            dir.path(),
            "ACME",
            &[
                ("2024-01-08", 100.0),
                ("2024-01-09", 101.0),
                ("2024-01-10", 102.0),
                ("2024-01-11", 103.0),
                ("2024-01-12", 104.0),
                ("2024-01-15", 105.0),
            ],
        );
        let store = CsvStore::open(dir.path());

        let daily = store.daily_bars("ACME").unwrap();
        assert_eq!(daily.len(), 6);
        assert_eq!(daily.get(0).unwrap().symbol, "ACME");

        let weekly = store.weekly_bars("ACME").unwrap();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.get(0).unwrap().close, 104.0);
    }

    #[test]
    fn sidecar_series_parse_when_present() {
        let dir = tempfile::tempdir().unwrap();
        write_daily(dir.path(), "ACME", &[("2024-01-02", 100.0)]);
        fs::write(
            dir.path().join("ACME.rs.csv"),
            "date,rs_4w,rs_12w,sector_rs,industry_rs\n2024-01-02,95.0,91.0,80.0,\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("ACME.fundamentals.csv"),
            "date,eps_growth_yoy,revenue_growth_yoy,market_cap\n2024-01-02,0.3,0.2,5000000000\n",
        )
        .unwrap();

        let store = CsvStore::open(dir.path());
        let rs = store.relative_strength("ACME").unwrap().unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.get(0).unwrap().sector_rs, Some(80.0));
        assert_eq!(rs.get(0).unwrap().industry_rs, None);

        let fundamentals = store.fundamentals("ACME").unwrap().unwrap();
        assert!((fundamentals.get(0).unwrap().eps_growth_yoy - 0.3).abs() < 1e-12);

        assert!(store.earnings("ACME").unwrap().is_none());
    }

    #[test]
    fn duplicate_dates_are_malformed_not_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        write_daily(
            dir.path(),
            "ACME",
            &[("2024-01-02", 100.0), ("2024-01-02", 101.0)],
        );
        let store = CsvStore::open(dir.path());
        assert!(matches!(
            store.daily_bars("ACME"),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::open(dir.path());
        assert!(matches!(
            store.daily_bars("GONE"),
            Err(StoreError::SymbolNotFound { .. })
        ));
    }
}
