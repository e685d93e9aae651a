//! Engine configuration: the surface consumed (not owned) by the core.
//!
//! All knobs deserialize with defaults so a run config only names what it
//! changes. `EngineSettings::validate` runs before any date is processed;
//! an invalid configuration is the only fatal error class in the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timing::ExecutionMode;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("signal weights must sum to 1.0 (got {0})")]
    WeightsSum(f64),

    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must lie in (0, 1) (got {value})")]
    RatioOutOfRange { name: &'static str, value: f64 },

    #[error("breakout horizon set must not be empty")]
    EmptyHorizons,

    #[error("max_position_pct cannot exceed max_exposure_pct")]
    PositionExceedsExposure,
}

/// Breakout lookback horizons, mapped onto the precomputed rolling highs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutHorizon {
    OneMonth,
    ThreeMonths,
    SixMonths,
    TwelveMonths,
    TwoYears,
}

impl BreakoutHorizon {
    /// Index into `indicators::calculator::BREAKOUT_WINDOWS`.
    pub fn slot(self) -> usize {
        match self {
            BreakoutHorizon::OneMonth => 0,
            BreakoutHorizon::ThreeMonths => 1,
            BreakoutHorizon::SixMonths => 2,
            BreakoutHorizon::TwelveMonths => 3,
            BreakoutHorizon::TwoYears => 4,
        }
    }

    pub fn all() -> Vec<BreakoutHorizon> {
        vec![
            BreakoutHorizon::OneMonth,
            BreakoutHorizon::ThreeMonths,
            BreakoutHorizon::SixMonths,
            BreakoutHorizon::TwelveMonths,
            BreakoutHorizon::TwoYears,
        ]
    }
}

/// Component weights for the strength score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub weekly: f64,
    pub breakout: f64,
    pub relative_strength: f64,
    pub fundamental: f64,
    pub earnings: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            weekly: 0.25,
            breakout: 0.30,
            relative_strength: 0.20,
            fundamental: 0.15,
            earnings: 0.10,
        }
    }
}

impl SignalWeights {
    pub fn sum(&self) -> f64 {
        self.weekly + self.breakout + self.relative_strength + self.fundamental + self.earnings
    }
}

/// Signal thresholds and combination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Relative-strength rating floor (percentile scale).
    pub rs_threshold: f64,
    /// Weekly close must sit within this fraction of the 52-week high.
    pub weekly_proximity: f64,
    pub min_eps_growth: f64,
    pub min_revenue_growth: f64,
    pub min_earnings_surprise: f64,
    /// When true the earnings component gates entry; default is
    /// informational only.
    pub earnings_gate: bool,
    pub horizons: Vec<BreakoutHorizon>,
    /// target = entry + target_adr_mult * ADR.
    pub target_adr_mult: f64,
    /// evaluation stop = entry - stop_adr_mult * ADR.
    pub stop_adr_mult: f64,
    pub weights: SignalWeights,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rs_threshold: 90.0,
            weekly_proximity: 0.25,
            min_eps_growth: 0.0,
            min_revenue_growth: 0.0,
            min_earnings_surprise: 0.0,
            earnings_gate: false,
            horizons: BreakoutHorizon::all(),
            target_adr_mult: 10.0,
            stop_adr_mult: 1.5,
            weights: SignalWeights::default(),
        }
    }
}

/// Risk-manager parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    /// Initial stop discount: stop = entry * (1 - init_risk).
    pub init_risk: f64,
    /// Ratchet step: one profit unit per std_risk of unrealized return.
    pub std_risk: f64,
    /// Unrealized return that triggers the one-time half exit.
    pub half_exit_trigger: f64,
    /// Sessions a stopped-out symbol is barred from re-entry.
    pub whipsaw_cooldown: usize,
    /// Close the full position when the target price trades.
    pub take_target: bool,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            init_risk: 0.03,
            std_risk: 0.05,
            half_exit_trigger: 0.20,
            whipsaw_cooldown: 5,
            take_target: false,
        }
    }
}

/// Position-sizing limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingParams {
    /// Fraction of equity risked per trade (cash-at-risk).
    pub risk_per_trade: f64,
    /// Cap on a single position's cost as a fraction of equity.
    pub max_position_pct: f64,
    /// Cap on total open exposure as a fraction of equity.
    pub max_exposure_pct: f64,
}

impl Default for SizingParams {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.01,
            max_position_pct: 0.20,
            max_exposure_pct: 1.0,
        }
    }
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub initial_cash: f64,
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

impl EngineSettings {
    pub fn backtest(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            mode: ExecutionMode::Backtest,
            trace_signals: false,
            signal: SignalParams::default(),
            risk: RiskParams::default(),
            sizing: SizingParams::default(),
        }
    }

    /// Startup validation. Anything rejected here is fatal; nothing past
    /// this point aborts a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name, value: f64| {
            if value <= 0.0 {
                Err(ConfigError::NonPositive { name, value })
            } else {
                Ok(())
            }
        };
        let ratio = |name, value: f64| {
            if value <= 0.0 || value >= 1.0 {
                Err(ConfigError::RatioOutOfRange { name, value })
            } else {
                Ok(())
            }
        };

        positive("initial_cash", self.initial_cash)?;
        positive("rs_threshold", self.signal.rs_threshold)?;
        positive("target_adr_mult", self.signal.target_adr_mult)?;
        positive("stop_adr_mult", self.signal.stop_adr_mult)?;
        positive("half_exit_trigger", self.risk.half_exit_trigger)?;
        ratio("init_risk", self.risk.init_risk)?;
        ratio("std_risk", self.risk.std_risk)?;
        ratio("weekly_proximity", self.signal.weekly_proximity)?;
        ratio("risk_per_trade", self.sizing.risk_per_trade)?;

        if self.sizing.max_position_pct <= 0.0 || self.sizing.max_position_pct > 1.0 {
            return Err(ConfigError::RatioOutOfRange {
                name: "max_position_pct",
                value: self.sizing.max_position_pct,
            });
        }
        if self.sizing.max_exposure_pct <= 0.0 || self.sizing.max_exposure_pct > 1.0 {
            return Err(ConfigError::RatioOutOfRange {
                name: "max_exposure_pct",
                value: self.sizing.max_exposure_pct,
            });
        }
        if self.sizing.max_position_pct > self.sizing.max_exposure_pct {
            return Err(ConfigError::PositionExceedsExposure);
        }

        if self.signal.horizons.is_empty() {
            return Err(ConfigError::EmptyHorizons);
        }

        let sum = self.signal.weights.sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ConfigError::WeightsSum(sum));
        }

        Ok(())
    }
}
