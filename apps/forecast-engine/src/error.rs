//! Error types for the forecast engine.
//!
//! The simulation core performs no I/O, so its taxonomy is narrow:
//! precondition violations are rejected before any work starts, while
//! degenerate statistics and short histories are valid (the latter is
//! surfaced as a [`SimulationWarning`](crate::simulation::SimulationWarning)).
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `InvalidInput` | Engine preconditions (run count, reference price) |
//! | `InvalidPrice` | Price series construction |
//! | `InvalidSymbol` | Symbol parsing |
//! | `MissingLiveQuote` | `LiveQuote` reference policy without a quote |
//! | `DataUnavailable` | Market data lookups at the use-case boundary |
//! | `ThreadPool` / `Join` | Worker pool and blocking task plumbing |

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the forecast engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    /// A caller-supplied parameter violates an engine precondition.
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// Offending parameter name.
        field: String,
        /// Description of the violation.
        message: String,
    },

    /// A historical close is non-positive or not finite.
    #[error("Invalid close {price} on {date}: prices must be positive and finite")]
    InvalidPrice {
        /// Date of the observation.
        date: NaiveDate,
        /// Rejected price.
        price: f64,
    },

    /// A ticker symbol failed validation.
    #[error("Invalid symbol '{symbol}': {message}")]
    InvalidSymbol {
        /// Raw symbol as supplied.
        symbol: String,
        /// Description of the violation.
        message: String,
    },

    /// The live quote reference policy was selected but no quote was supplied.
    #[error("Reference price policy requires a live quote but none was supplied")]
    MissingLiveQuote,

    /// Market data could not be obtained for a symbol.
    #[error("Data unavailable for symbol {symbol}: {message}")]
    DataUnavailable {
        /// Requested symbol.
        symbol: String,
        /// Underlying provider message.
        message: String,
    },

    /// The simulation worker pool could not be built.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },

    /// A blocking simulation task panicked or was cancelled by the runtime.
    #[error("Simulation task failed: {message}")]
    Join {
        /// Error message.
        message: String,
    },
}

impl ForecastError {
    /// Build an [`ForecastError::InvalidInput`] error.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
