//! Configuration for a simulation batch.

use serde::{Deserialize, Serialize};

use crate::domain::HorizonModel;
use crate::error::{ForecastError, Result};

/// Which price anchors every simulated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePricePolicy {
    /// Highest close in the historical window.
    #[default]
    HistoricalMax,
    /// The instrument's live quote.
    LiveQuote,
}

/// Configuration for a Monte Carlo forecast batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of simulated paths.
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// Steps per path.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,

    /// How steps map onto the calendar.
    #[serde(default)]
    pub horizon_model: HorizonModel,

    /// Seed for reproducibility (None = random).
    #[serde(default)]
    pub seed: Option<u64>,

    /// Which price anchors the paths.
    #[serde(default)]
    pub reference_price_policy: ReferencePricePolicy,

    /// Anchor used by `HistoricalMax` when the history has fewer than two closes.
    #[serde(default = "default_fallback_start_price")]
    pub fallback_start_price: f64,

    /// Maximum number of worker threads (0 = rayon global pool).
    #[serde(default)]
    pub max_threads: usize,

    /// Minimum parallelization threshold (batches below this run sequentially).
    #[serde(default = "default_min_parallel_runs")]
    pub min_parallel_runs: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            horizon_days: default_horizon_days(),
            horizon_model: HorizonModel::CalendarDays,
            seed: None,
            reference_price_policy: ReferencePricePolicy::HistoricalMax,
            fallback_start_price: default_fallback_start_price(),
            max_threads: 0,
            min_parallel_runs: default_min_parallel_runs(),
        }
    }
}

impl SimulationConfig {
    /// Check the batch preconditions.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidInput`] when `runs` is zero or the
    /// fallback start price is not positive and finite.
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(ForecastError::invalid_input("runs", "must be at least 1"));
        }
        if !(self.fallback_start_price.is_finite() && self.fallback_start_price > 0.0) {
            return Err(ForecastError::invalid_input(
                "fallback_start_price",
                format!("must be positive, got {}", self.fallback_start_price),
            ));
        }
        Ok(())
    }
}

const fn default_runs() -> u32 {
    1000
}

const fn default_horizon_days() -> u32 {
    252
}

const fn default_fallback_start_price() -> f64 {
    100.0
}

const fn default_min_parallel_runs() -> u32 {
    64
}

/// Builder for [`SimulationConfig`].
#[derive(Debug, Default)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of paths.
    #[must_use]
    pub const fn runs(mut self, runs: u32) -> Self {
        self.config.runs = runs;
        self
    }

    /// Set steps per path.
    #[must_use]
    pub const fn horizon_days(mut self, days: u32) -> Self {
        self.config.horizon_days = days;
        self
    }

    /// Set the calendar model.
    #[must_use]
    pub const fn horizon_model(mut self, model: HorizonModel) -> Self {
        self.config.horizon_model = model;
        self
    }

    /// Set seed for reproducibility.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the reference price policy.
    #[must_use]
    pub const fn reference_price_policy(mut self, policy: ReferencePricePolicy) -> Self {
        self.config.reference_price_policy = policy;
        self
    }

    /// Set the fallback start price.
    #[must_use]
    pub const fn fallback_start_price(mut self, price: f64) -> Self {
        self.config.fallback_start_price = price;
        self
    }

    /// Set the worker thread cap.
    #[must_use]
    pub const fn max_threads(mut self, threads: usize) -> Self {
        self.config.max_threads = threads;
        self
    }

    /// Set the parallelization threshold.
    #[must_use]
    pub const fn min_parallel_runs(mut self, runs: u32) -> Self {
        self.config.min_parallel_runs = runs;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimulationConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();

        assert_eq!(config.runs, 1000);
        assert_eq!(config.horizon_days, 252);
        assert_eq!(config.horizon_model, HorizonModel::CalendarDays);
        assert_eq!(config.reference_price_policy, ReferencePricePolicy::HistoricalMax);
        assert_eq!(config.fallback_start_price, 100.0);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SimulationConfigBuilder::new()
            .runs(10)
            .horizon_days(5)
            .horizon_model(HorizonModel::TradingDays)
            .seed(42)
            .reference_price_policy(ReferencePricePolicy::LiveQuote)
            .fallback_start_price(25.0)
            .max_threads(2)
            .min_parallel_runs(1)
            .build();

        assert_eq!(config.runs, 10);
        assert_eq!(config.horizon_days, 5);
        assert_eq!(config.horizon_model, HorizonModel::TradingDays);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.reference_price_policy, ReferencePricePolicy::LiveQuote);
        assert_eq!(config.fallback_start_price, 25.0);
        assert_eq!(config.max_threads, 2);
        assert_eq!(config.min_parallel_runs, 1);
    }

    #[test]
    fn test_zero_runs_rejected() {
        let config = SimulationConfigBuilder::new().runs(0).build();

        let Err(err) = config.validate() else {
            panic!("expected error for zero runs");
        };
        assert!(err.to_string().contains("runs"));
    }

    #[test]
    fn test_non_positive_fallback_rejected() {
        let config = SimulationConfigBuilder::new().fallback_start_price(0.0).build();
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"runs": 50, "reference_price_policy": "live_quote"}"#).unwrap();

        assert_eq!(config.runs, 50);
        assert_eq!(config.horizon_days, 252);
        assert_eq!(config.reference_price_policy, ReferencePricePolicy::LiveQuote);
        assert_eq!(config.min_parallel_runs, 64);
    }
}
