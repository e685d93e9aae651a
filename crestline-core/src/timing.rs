//! Timing policy: the single seam between live evaluation and backtest replay.
//!
//! Daily-close-derived values are not knowable until after the session ends,
//! so a backtest decision simulated "before" the session must exclude the
//! current bar for the daily-technical and relative-strength families.
//! Weekly, fundamental and earnings records are already lagged by their own
//! reporting cadence and are safe at full currency in both modes.
//!
//! The policy is injected once at construction and consulted wherever stored
//! observations are read. The rule table is fixed; it is not a configuration
//! surface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which column of the rule table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Decisions made after the session close: bar `t` is observable.
    Live,
    /// Historical replay simulating action at the open: daily-close-derived
    /// values for bar `t` are withheld.
    Backtest,
}

/// Indicator family, keyed to one row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesFamily {
    DailyTechnical,
    RelativeStrength,
    Weekly,
    Fundamental,
    Earnings,
}

/// Latest observation date permissible as input at an evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationCutoff {
    /// Observations dated up to and including the evaluation date.
    Through(NaiveDate),
    /// Observations dated strictly before the evaluation date.
    Before(NaiveDate),
}

impl ObservationCutoff {
    pub fn admits(&self, observed: NaiveDate) -> bool {
        match *self {
            ObservationCutoff::Through(t) => observed <= t,
            ObservationCutoff::Before(t) => observed < t,
        }
    }
}

/// The rule table, as a value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPolicy {
    mode: ExecutionMode,
}

impl TimingPolicy {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    pub fn live() -> Self {
        Self::new(ExecutionMode::Live)
    }

    pub fn backtest() -> Self {
        Self::new(ExecutionMode::Backtest)
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Latest observation date permissible for `family` at evaluation date `t`.
    pub fn cutoff(&self, family: SeriesFamily, t: NaiveDate) -> ObservationCutoff {
        match (self.mode, family) {
            (ExecutionMode::Backtest, SeriesFamily::DailyTechnical)
            | (ExecutionMode::Backtest, SeriesFamily::RelativeStrength) => {
                ObservationCutoff::Before(t)
            }
            _ => ObservationCutoff::Through(t),
        }
    }
}
