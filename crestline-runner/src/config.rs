//! TOML run configuration.
//!
//! The file maps section-for-section onto the core's `EngineSettings`; a
//! config only names what it overrides. Validation happens here, before a
//! single date is processed, and is the run's only fatal error path.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crestline_core::config::{ConfigError, EngineSettings, RiskParams, SignalParams, SizingParams};
use crestline_core::timing::ExecutionMode;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// A complete, serializable run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub initial_cash: f64,
    #[serde(default = "default_mode")]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub trace_signals: bool,
    #[serde(default)]
    pub signal: SignalParams,
    #[serde(default)]
    pub risk: RiskParams,
    #[serde(default)]
    pub sizing: SizingParams,
}

fn default_name() -> String {
    "crestline".to_string()
}

fn default_mode() -> ExecutionMode {
    ExecutionMode::Backtest
}

impl BacktestConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigFileError> {
        let config: BacktestConfig = toml::from_str(raw)?;
        config.engine_settings()?; // validate eagerly
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Validated engine settings for this config.
    pub fn engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        let settings = EngineSettings {
            initial_cash: self.initial_cash,
            mode: self.mode,
            trace_signals: self.trace_signals,
            signal: self.signal.clone(),
            risk: self.risk,
            sizing: self.sizing,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Deterministic content hash: two identical configs share a run id,
    /// which is what makes replay results comparable and cacheable.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization cannot fail");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
