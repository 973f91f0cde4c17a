//! Results of a simulation batch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::SimulationSummary;

/// Degraded-mode conditions that did not stop the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationWarning {
    /// The history was too short to compute any return.
    InsufficientHistory {
        /// Number of closes available.
        points: usize,
        /// Reference price used instead of the historical maximum, if any.
        fallback_price: Option<f64>,
    },
}

impl fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientHistory {
                points,
                fallback_price: Some(price),
            } => write!(
                f,
                "insufficient history ({points} closes): using fallback start price {price} and flat statistics"
            ),
            Self::InsufficientHistory {
                points,
                fallback_price: None,
            } => write!(
                f,
                "insufficient history ({points} closes): using flat statistics"
            ),
        }
    }
}

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// All requested runs finished.
    Completed,
    /// The batch was cancelled between runs.
    Aborted {
        /// Runs finished before cancellation.
        completed_runs: u32,
    },
}

/// Complete result of a simulation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// How the batch ended.
    pub status: BatchStatus,
    /// Summary over the finished runs. `None` only if a cancelled batch
    /// finished no run at all.
    pub summary: Option<SimulationSummary>,
    /// Degraded-mode conditions.
    pub warnings: Vec<SimulationWarning>,
    /// Seed the per-run generators were derived from.
    pub batch_seed: u64,
    /// Wall-clock duration of the batch.
    pub total_time_ms: u64,
}

impl SimulationOutcome {
    /// Whether every requested run finished.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, BatchStatus::Completed)
    }

    /// Whether the history was too short for return statistics.
    #[must_use]
    pub fn has_insufficient_history(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, SimulationWarning::InsufficientHistory { .. }))
    }
}
