//! Domain layer - the numerical core with no I/O.
//!
//! - `price_series`: validated daily close history and ticker symbols
//! - `statistics`: per-month log-return mean and variance
//! - `path`: geometric Brownian motion path integration
//! - `summary`: reduction of terminal prices into the forecast summary

pub mod path;
pub mod price_series;
pub mod statistics;
pub mod summary;

pub use path::{HorizonModel, PathSimulator, SimulatedPath};
pub use price_series::{HistoricalPriceSeries, Symbol};
pub use statistics::{MONTHS_PER_YEAR, MonthStats, MonthlyReturnStatistics};
pub use summary::{MonthlyChange, SimulationSummary};
