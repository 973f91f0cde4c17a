//! Monte Carlo batch orchestration.
//!
//! Builds monthly return statistics once, drives independent path
//! simulations across a Rayon worker pool, reports progress, and reduces the
//! terminal prices into a [`SimulationSummary`](crate::domain::SimulationSummary).
//!
//! # Thread Pool Configuration
//!
//! Batches with at least `min_parallel_runs` runs execute on Rayon. With
//! `max_threads = 0` the global pool is used; otherwise a dedicated pool of
//! that size is built for the batch. Every run seeds its own generator from
//! `batch_seed + run_index`, so seeded batches give identical results
//! sequentially and in parallel.
//!
//! # Example
//!
//! ```ignore
//! use forecast_engine::simulation::{
//!     MonteCarloForecaster, NoOpProgressSink, SimulationConfig, SimulationInput,
//! };
//!
//! let forecaster = MonteCarloForecaster::new(SimulationConfig::default());
//! let outcome = forecaster.run(&SimulationInput::new(&history, today), &NoOpProgressSink)?;
//! ```

mod config;
mod executor;
mod outcome;
mod progress;

pub use config::{ReferencePricePolicy, SimulationConfig, SimulationConfigBuilder};
pub use executor::{MonteCarloForecaster, SimulationInput};
pub use outcome::{BatchStatus, SimulationOutcome, SimulationWarning};
pub use progress::{NoOpProgressSink, Progress, ProgressSink, ProgressTracker};
