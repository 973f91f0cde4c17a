//! Monte Carlo forecast executor using Rayon.

use std::time::Instant;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

use crate::domain::{
    HistoricalPriceSeries, MonthlyReturnStatistics, PathSimulator, SimulatedPath,
    SimulationSummary,
};
use crate::error::{ForecastError, Result};

use super::config::{ReferencePricePolicy, SimulationConfig};
use super::outcome::{BatchStatus, SimulationOutcome, SimulationWarning};
use super::progress::{ProgressSink, ProgressTracker};

/// Inputs of one forecast batch.
#[derive(Debug, Clone, Copy)]
pub struct SimulationInput<'a> {
    /// Daily close history.
    pub history: &'a HistoricalPriceSeries,
    /// Calendar date of the first simulated step ("today").
    pub start_date: NaiveDate,
    /// Live quote, required by [`ReferencePricePolicy::LiveQuote`].
    pub live_quote: Option<f64>,
}

impl<'a> SimulationInput<'a> {
    /// Input without a live quote.
    #[must_use]
    pub const fn new(history: &'a HistoricalPriceSeries, start_date: NaiveDate) -> Self {
        Self {
            history,
            start_date,
            live_quote: None,
        }
    }

    /// Attach a live quote.
    #[must_use]
    pub const fn with_live_quote(mut self, quote: f64) -> Self {
        self.live_quote = Some(quote);
        self
    }
}

/// Runs batches of independent simulated paths and reduces them.
#[derive(Debug, Clone)]
pub struct MonteCarloForecaster {
    config: SimulationConfig,
}

impl MonteCarloForecaster {
    /// Create a new forecaster.
    #[must_use]
    pub const fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Batch configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        if self.config.max_threads > 0 {
            self.config.max_threads
        } else {
            rayon::current_num_threads()
        }
    }

    /// Run a batch to completion.
    ///
    /// # Errors
    ///
    /// See [`MonteCarloForecaster::run_with_cancellation`].
    pub fn run(
        &self,
        input: &SimulationInput<'_>,
        sink: &dyn ProgressSink,
    ) -> Result<SimulationOutcome> {
        self.run_with_cancellation(input, sink, &CancellationToken::new())
    }

    /// Run a batch, checking `cancel` before every run.
    ///
    /// A cancelled batch is not an error: the outcome is
    /// [`BatchStatus::Aborted`] with a summary over the runs that finished,
    /// and the final 100% report is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidInput`] for a zero run count or a
    /// non-positive reference price, [`ForecastError::MissingLiveQuote`] when
    /// the live quote policy has no quote, and
    /// [`ForecastError::ThreadPool`] if a dedicated pool cannot be built.
    pub fn run_with_cancellation(
        &self,
        input: &SimulationInput<'_>,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<SimulationOutcome> {
        self.config.validate()?;
        let (reference_price, warnings) = self.resolve_reference_price(input)?;

        let span = info_span!(
            "simulation_batch",
            runs = self.config.runs,
            horizon_days = self.config.horizon_days
        );
        let _guard = span.enter();

        for warning in &warnings {
            warn!(%warning, "Simulating in degraded mode");
        }

        let statistics = MonthlyReturnStatistics::from_series(input.history);
        let batch_seed = self.config.seed.unwrap_or_else(rand::random);
        let start_time = Instant::now();

        info!(
            runs = self.config.runs,
            horizon_days = self.config.horizon_days,
            reference_price,
            batch_seed,
            observations = statistics.total_observations(),
            deterministic = statistics.is_deterministic(),
            threads = self.effective_thread_count(),
            "Running Monte Carlo forecast"
        );

        let batch = Batch {
            runs: self.config.runs,
            simulator: PathSimulator::new(&statistics, self.config.horizon_model),
            reference_price,
            horizon_days: self.config.horizon_days,
            start_date: input.start_date,
            batch_seed,
            tracker: ProgressTracker::new(u64::from(self.config.runs)),
            sink,
            cancel,
        };

        let paths = if self.config.runs >= self.config.min_parallel_runs {
            self.run_parallel(&batch)?
        } else {
            Self::run_sequential(&batch)
        };

        let completed_runs = paths.len() as u32;
        let status = if completed_runs == self.config.runs {
            batch.tracker.finish(sink);
            BatchStatus::Completed
        } else {
            warn!(
                completed_runs,
                requested_runs = self.config.runs,
                "Monte Carlo forecast cancelled"
            );
            BatchStatus::Aborted { completed_runs }
        };

        let summary =
            SimulationSummary::from_paths(reference_price, self.config.horizon_days, &paths);
        let elapsed = start_time.elapsed();
        let progress = batch.tracker.progress();

        if let Some(summary) = &summary {
            info!(
                expected_close = summary.expected_close,
                high = summary.high,
                low = summary.low,
                relative_error_pct = summary.relative_error_pct,
                runs_per_sec = progress.runs_per_sec,
                completed_pct = progress.percentage(),
                "Monte Carlo forecast complete in {:.2}s",
                elapsed.as_secs_f64()
            );
        }

        Ok(SimulationOutcome {
            status,
            summary,
            warnings,
            batch_seed,
            total_time_ms: elapsed.as_millis() as u64,
        })
    }

    fn resolve_reference_price(
        &self,
        input: &SimulationInput<'_>,
    ) -> Result<(f64, Vec<SimulationWarning>)> {
        let points = input.history.len();
        let short_history = points < 2;

        let (price, fallback_price) = match self.config.reference_price_policy {
            ReferencePricePolicy::HistoricalMax if short_history => (
                self.config.fallback_start_price,
                Some(self.config.fallback_start_price),
            ),
            ReferencePricePolicy::HistoricalMax => (
                input
                    .history
                    .max_close()
                    .unwrap_or(self.config.fallback_start_price),
                None,
            ),
            ReferencePricePolicy::LiveQuote => {
                (input.live_quote.ok_or(ForecastError::MissingLiveQuote)?, None)
            }
        };

        if !(price.is_finite() && price > 0.0) {
            return Err(ForecastError::invalid_input(
                "reference_price",
                format!("must be positive, got {price}"),
            ));
        }

        let warnings = if short_history {
            vec![SimulationWarning::InsufficientHistory {
                points,
                fallback_price,
            }]
        } else {
            Vec::new()
        };

        Ok((price, warnings))
    }

    fn run_parallel(&self, batch: &Batch<'_>) -> Result<Vec<SimulatedPath>> {
        let simulate_all = || {
            (0..self.config.runs)
                .into_par_iter()
                .map(|index| batch.simulate_run(index))
                .collect::<Vec<_>>()
        };

        let results = if self.config.max_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_threads)
                .build()
                .map_err(|e| ForecastError::ThreadPool {
                    message: e.to_string(),
                })?;
            pool.install(simulate_all)
        } else {
            simulate_all()
        };

        Ok(results.into_iter().flatten().collect())
    }

    fn run_sequential(batch: &Batch<'_>) -> Vec<SimulatedPath> {
        (0..batch.runs)
            .map_while(|index| batch.simulate_run(index))
            .collect()
    }
}

/// Shared, read-only state of one batch.
struct Batch<'a> {
    runs: u32,
    simulator: PathSimulator<'a>,
    reference_price: f64,
    horizon_days: u32,
    start_date: NaiveDate,
    batch_seed: u64,
    tracker: ProgressTracker,
    sink: &'a dyn ProgressSink,
    cancel: &'a CancellationToken,
}

impl Batch<'_> {
    /// Simulate run `index` with its own generator, or `None` once cancelled.
    fn simulate_run(&self, index: u32) -> Option<SimulatedPath> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(self.batch_seed.wrapping_add(u64::from(index)));
        let path = self.simulator.simulate(
            self.reference_price,
            self.horizon_days,
            self.start_date,
            &mut rng,
        );

        self.tracker.run_completed(self.sink);
        if index % 1000 == 0 {
            let progress = self.tracker.progress();
            debug!(
                run = index,
                completed = progress.completed,
                eta_secs = progress.eta_secs,
                "Monte Carlo progress"
            );
        }

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::SimulationConfigBuilder;
    use crate::simulation::progress::NoOpProgressSink;
    use crate::simulation::progress::tests::RecordingSink;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trending_history() -> HistoricalPriceSeries {
        let closes = (0..800).map(|i| {
            let t = f64::from(i);
            100.0 * (0.0004 * t).exp() * (1.0 + 0.02 * (t * 0.7).sin())
        });
        HistoricalPriceSeries::from_daily_closes(date(2022, 1, 3), closes).unwrap()
    }

    #[test]
    fn test_forecaster_creation() {
        let forecaster = MonteCarloForecaster::new(SimulationConfig::default());
        assert!(forecaster.effective_thread_count() > 0);
    }

    #[test]
    fn flat_history_is_deterministic() {
        let history =
            HistoricalPriceSeries::from_daily_closes(date(2022, 1, 1), std::iter::repeat_n(50.0, 500))
                .unwrap();
        let forecaster = MonteCarloForecaster::new(SimulationConfig::default());

        let outcome = forecaster
            .run(&SimulationInput::new(&history, date(2024, 6, 1)), &NoOpProgressSink)
            .unwrap();

        let summary = outcome.summary.unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(summary.expected_close, 50.0);
        assert_eq!(summary.high, 50.0);
        assert_eq!(summary.low, 50.0);
        assert_eq!(summary.relative_error_pct, 0.0);
        assert_eq!(summary.runs, 1000);
    }

    #[test]
    fn single_run_single_day_zero_statistics() {
        let history = HistoricalPriceSeries::default();
        let config = SimulationConfigBuilder::new()
            .runs(1)
            .horizon_days(1)
            .build();
        let sink = RecordingSink::default();

        let outcome = MonteCarloForecaster::new(config)
            .run(&SimulationInput::new(&history, date(2024, 1, 1)), &sink)
            .unwrap();

        let summary = outcome.summary.as_ref().unwrap();
        assert_eq!(summary.expected_close, 100.0);
        assert_eq!(summary.high, 100.0);
        assert_eq!(summary.low, 100.0);
        assert_eq!(summary.relative_error_pct, 0.0);
        assert!(outcome.has_insufficient_history());
        assert_eq!(sink.reports(), vec![0, 100]);
    }

    #[test]
    fn extreme_close_ratios_complete_without_panic() {
        // January drift overflows to inf, February drift then multiplies by 0.
        let history = HistoricalPriceSeries::new([
            (date(2023, 1, 1), 1e-300),
            (date(2023, 1, 2), 1e300),
            (date(2023, 2, 1), 1e-300),
        ])
        .unwrap();
        let config = SimulationConfigBuilder::new()
            .runs(1)
            .horizon_days(40)
            .build();

        let outcome = MonteCarloForecaster::new(config)
            .run(
                &SimulationInput::new(&history, date(2024, 1, 30)),
                &NoOpProgressSink,
            )
            .unwrap();

        assert!(outcome.is_completed());
        let summary = outcome.summary.unwrap();
        assert!(!summary.expected_close.is_finite());
    }

    #[test]
    fn historical_max_anchors_paths() {
        let history = HistoricalPriceSeries::from_daily_closes(
            date(2024, 1, 1),
            [10.0, 30.0, 20.0, 25.0],
        )
        .unwrap();
        let config = SimulationConfigBuilder::new().runs(5).seed(3).build();

        let outcome = MonteCarloForecaster::new(config)
            .run(&SimulationInput::new(&history, date(2024, 2, 1)), &NoOpProgressSink)
            .unwrap();

        assert_eq!(outcome.summary.unwrap().reference_price, 30.0);
    }

    #[test]
    fn live_quote_policy_uses_quote() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new()
            .runs(4)
            .seed(1)
            .reference_price_policy(ReferencePricePolicy::LiveQuote)
            .build();
        let input = SimulationInput::new(&history, date(2024, 3, 1)).with_live_quote(42.0);

        let outcome = MonteCarloForecaster::new(config)
            .run(&input, &NoOpProgressSink)
            .unwrap();

        assert_eq!(outcome.summary.unwrap().reference_price, 42.0);
    }

    #[test]
    fn live_quote_policy_without_quote_fails() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new()
            .reference_price_policy(ReferencePricePolicy::LiveQuote)
            .build();

        let result = MonteCarloForecaster::new(config)
            .run(&SimulationInput::new(&history, date(2024, 3, 1)), &NoOpProgressSink);

        assert_eq!(result, Err(ForecastError::MissingLiveQuote));
    }

    #[test]
    fn zero_runs_rejected_before_work() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new().runs(0).build();
        let sink = RecordingSink::default();

        let result = MonteCarloForecaster::new(config)
            .run(&SimulationInput::new(&history, date(2024, 3, 1)), &sink);

        assert!(matches!(result, Err(ForecastError::InvalidInput { .. })));
        assert!(sink.reports().is_empty());
    }

    #[test]
    fn non_positive_live_quote_rejected() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new()
            .reference_price_policy(ReferencePricePolicy::LiveQuote)
            .build();
        let input = SimulationInput::new(&history, date(2024, 3, 1)).with_live_quote(-5.0);

        let result = MonteCarloForecaster::new(config).run(&input, &NoOpProgressSink);

        assert!(matches!(result, Err(ForecastError::InvalidInput { .. })));
    }

    #[test]
    fn seeded_batch_is_identical_sequential_and_parallel() {
        let history = trending_history();
        let input = SimulationInput::new(&history, date(2024, 3, 1));
        let base = SimulationConfigBuilder::new().runs(200).seed(2024);

        let sequential = MonteCarloForecaster::new(base.build())
            .run(&input, &NoOpProgressSink)
            .unwrap();
        let parallel = MonteCarloForecaster::new(
            SimulationConfigBuilder::new()
                .runs(200)
                .seed(2024)
                .min_parallel_runs(1)
                .max_threads(4)
                .build(),
        )
        .run(&input, &NoOpProgressSink)
        .unwrap();

        assert_eq!(sequential.batch_seed, 2024);
        assert_eq!(sequential.summary, parallel.summary);
    }

    #[test]
    fn parallel_progress_is_monotonic_and_ends_at_hundred() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new()
            .runs(500)
            .horizon_days(30)
            .min_parallel_runs(1)
            .build();
        let sink = RecordingSink::default();

        let outcome = MonteCarloForecaster::new(config)
            .run(&SimulationInput::new(&history, date(2024, 3, 1)), &sink)
            .unwrap();

        let reports = sink.reports();
        assert!(outcome.is_completed());
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reports.last(), Some(&100));
    }

    #[test]
    fn random_history_keeps_summary_invariants() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new().runs(300).seed(11).build();

        let summary = MonteCarloForecaster::new(config)
            .run(&SimulationInput::new(&history, date(2024, 3, 1)), &NoOpProgressSink)
            .unwrap()
            .summary
            .unwrap();

        assert!(summary.high >= summary.expected_close);
        assert!(summary.expected_close >= summary.low);
        assert!(summary.low > 0.0);
        assert!(summary.relative_error_pct >= 0.0);
        assert!(summary.expected_close.is_finite());
        assert!(summary.high > summary.low);
    }

    #[test]
    fn cancelled_batch_is_aborted_not_error() {
        let history = trending_history();
        let config = SimulationConfigBuilder::new().runs(100).seed(5).build();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let sink = RecordingSink::default();

        let outcome = MonteCarloForecaster::new(config)
            .run_with_cancellation(&SimulationInput::new(&history, date(2024, 3, 1)), &sink, &cancel)
            .unwrap();

        assert_eq!(outcome.status, BatchStatus::Aborted { completed_runs: 0 });
        assert!(outcome.summary.is_none());
        assert!(!sink.reports().contains(&100));
    }

    #[test]
    fn cancellation_mid_batch_keeps_partial_summary() {
        struct CancelAt<'a> {
            at: u8,
            token: &'a CancellationToken,
        }

        impl ProgressSink for CancelAt<'_> {
            fn report_progress(&self, percent: u8) {
                if percent >= self.at {
                    self.token.cancel();
                }
            }
        }

        let history = trending_history();
        let config = SimulationConfigBuilder::new().runs(10).seed(5).build();
        let cancel = CancellationToken::new();
        let sink = CancelAt {
            at: 20,
            token: &cancel,
        };

        let outcome = MonteCarloForecaster::new(config)
            .run_with_cancellation(&SimulationInput::new(&history, date(2024, 3, 1)), &sink, &cancel)
            .unwrap();

        assert_eq!(outcome.status, BatchStatus::Aborted { completed_runs: 3 });
        assert_eq!(outcome.summary.unwrap().runs, 3);
    }
}
