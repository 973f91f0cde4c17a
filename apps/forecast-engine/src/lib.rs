// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::cast_possible_truncation,
        clippy::items_after_statements
    )
)]

//! Forecast Engine - Monte Carlo Price Forecasting
//!
//! Estimates the distribution of an instrument's price at a future horizon
//! by simulating many geometric Brownian motion paths. Each simulated day
//! draws its drift and volatility from the statistics of the calendar month
//! it falls in, learned from the instrument's trailing daily closes.
//!
//! # Architecture (Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure numerics with no I/O
//!   - `price_series`: Symbols and validated close histories
//!   - `statistics`: Per-month log-return mean and variance
//!   - `path`: Calendar cursor and single-path GBM simulation
//!   - `summary`: Reduction of terminal prices into a forecast
//!
//! - **Simulation**: Batch orchestration on Rayon with progress reporting,
//!   cancellation, and seeded reproducibility
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `MarketDataPort`, `PresenterPort`
//!   - `use_cases`: `RunForecast`
//!
//! - **Infrastructure**: Adapters
//!   - `market_data`: JSON instrument files
//!   - `presenter`: Console output
//!
//! - **Config / Telemetry**: YAML configuration and tracing setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Layers
// =============================================================================

/// Domain layer - Core numerics with no external dependencies.
pub mod domain;

/// Monte Carlo batch execution.
pub mod simulation;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Error types.
pub mod error;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use domain::{
    HistoricalPriceSeries, HorizonModel, MonthlyChange, MonthlyReturnStatistics, PathSimulator,
    SimulatedPath, SimulationSummary, Symbol,
};
pub use error::{ForecastError, Result};
pub use simulation::{
    BatchStatus, MonteCarloForecaster, ProgressSink, ReferencePricePolicy, SimulationConfig,
    SimulationInput, SimulationOutcome, SimulationWarning,
};

pub use application::ports::{
    InMemoryMarketData, InstrumentSnapshot, MarketData, MarketDataError, MarketDataPort,
    PresenterPort, TrailingWindow,
};
pub use application::use_cases::{ForecastReport, RunForecastUseCase};

pub use infrastructure::market_data::JsonFileMarketData;
pub use infrastructure::presenter::ConsolePresenter;
