//! Run orchestration: config -> engine -> metrics -> report.

use thiserror::Error;
use tracing::info;

use crestline_core::config::ConfigError;
use crestline_core::engine::{run_backtest, EngineError};
use crestline_core::store::MarketDataStore;

use crate::config::BacktestConfig;
use crate::report::BacktestReport;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Execute one run against a data store and assemble the report.
pub fn execute(
    config: &BacktestConfig,
    store: &dyn MarketDataStore,
) -> Result<BacktestReport, RunError> {
    let settings = config.engine_settings()?;
    let run_id = config.run_id();
    info!(name = %config.name, %run_id, mode = ?config.mode, "starting run");

    let result = run_backtest(store, &settings)?;
    info!(
        trades = result.trades.len(),
        sessions = result.session_count,
        final_equity = result.final_equity,
        "run finished"
    );

    Ok(BacktestReport::assemble(config, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::synthetic_store;

    #[test]
    fn invalid_config_fails_before_the_engine() {
        let mut config = BacktestConfig::from_toml_str("initial_cash = 100000.0").unwrap();
        config.initial_cash = -5.0; // mutate after parse-time validation
        let store = synthetic_store(1, 30, 3);
        assert!(matches!(
            execute(&config, &store).unwrap_err(),
            RunError::Config(_)
        ));
    }

    #[test]
    fn report_carries_run_identity() {
        let config = BacktestConfig::from_toml_str("initial_cash = 100000.0").unwrap();
        let store = synthetic_store(2, 40, 3);
        let report = execute(&config, &store).unwrap();
        assert_eq!(report.run_id, config.run_id());
        assert_eq!(report.session_count, 40);
        assert_eq!(report.symbol_count, 2);
    }
}
