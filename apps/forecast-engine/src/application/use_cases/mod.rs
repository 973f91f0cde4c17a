//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod run_forecast;

pub use run_forecast::{ForecastReport, RunForecastUseCase};
