//! Report assembly and export.
//!
//! A `BacktestReport` carries the metric block, the full trade ledger, the
//! equity curve, the optional signal trace and any run warnings. JSON is
//! the primary serialization; trades and equity also export as CSV
//! artifacts for spreadsheet work.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crestline_core::domain::{EquityPoint, SignalEvaluation, Trade};
use crestline_core::engine::RunResult;

use crate::config::BacktestConfig;
use crate::metrics::PerformanceMetrics;

/// Schema version for persisted report artifacts.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub name: String,
    pub run_id: String,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Per-date signal trace; empty unless tracing was enabled.
    pub evaluations: Vec<SignalEvaluation>,
    pub warnings: Vec<String>,
    pub session_count: usize,
    pub symbol_count: usize,
    pub initial_cash: f64,
    pub final_equity: f64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestReport {
    pub fn assemble(config: &BacktestConfig, result: RunResult) -> Self {
        let metrics = PerformanceMetrics::compute(&result.equity_curve, &result.trades);
        Self {
            schema_version: SCHEMA_VERSION,
            name: config.name.clone(),
            run_id: config.run_id(),
            metrics,
            trades: result.trades,
            equity_curve: result.equity_curve,
            evaluations: result.evaluations,
            warnings: result.warnings,
            session_count: result.session_count,
            symbol_count: result.symbol_count,
            initial_cash: config.initial_cash,
            final_equity: result.final_equity,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `report.json`, `trades.csv` and `equity.csv` under `dir`.
    pub fn write_artifacts(&self, dir: &Path) -> Result<(), ExportError> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join("report.json"), self.to_json_pretty()?)?;
        self.write_trades_csv(&dir.join("trades.csv"))?;
        self.write_equity_csv(&dir.join("equity.csv"))?;
        Ok(())
    }

    fn write_trades_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        for trade in &self.trades {
            writer.serialize(trade)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_equity_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        for point in &self.equity_curve {
            writer.serialize(point)?;
        }
        writer.flush()?;
        Ok(())
    }
}
