//! Run Forecast Use Case

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::ports::{InstrumentSnapshot, MarketDataPort, PresenterPort, TrailingWindow};
use crate::domain::Symbol;
use crate::error::{ForecastError, Result};
use crate::simulation::{MonteCarloForecaster, SimulationInput, SimulationOutcome};

/// Result of a forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Instrument metadata as fetched.
    pub snapshot: InstrumentSnapshot,
    /// Number of closes the statistics were built from.
    pub history_points: usize,
    /// Simulation result.
    pub outcome: SimulationOutcome,
}

/// Use case for forecasting one instrument: fetch, simulate, present.
pub struct RunForecastUseCase<M, P>
where
    M: MarketDataPort,
    P: PresenterPort + 'static,
{
    market_data: Arc<M>,
    presenter: Arc<P>,
    forecaster: MonteCarloForecaster,
    window: TrailingWindow,
}

impl<M, P> RunForecastUseCase<M, P>
where
    M: MarketDataPort,
    P: PresenterPort + 'static,
{
    /// Create a new RunForecastUseCase.
    pub const fn new(
        market_data: Arc<M>,
        presenter: Arc<P>,
        forecaster: MonteCarloForecaster,
        window: TrailingWindow,
    ) -> Self {
        Self {
            market_data,
            presenter,
            forecaster,
            window,
        }
    }

    /// Execute the use case.
    ///
    /// The simulation runs on a blocking task; `cancel` aborts it between
    /// runs. The summary is presented only for completed batches.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidSymbol`] for a malformed symbol,
    /// [`ForecastError::DataUnavailable`] when the market data lookup fails,
    /// and any engine precondition error.
    pub async fn execute(
        &self,
        raw_symbol: &str,
        today: NaiveDate,
        cancel: CancellationToken,
    ) -> Result<ForecastReport> {
        // 1. Normalize the symbol
        let symbol = Symbol::parse(raw_symbol)?;

        // 2. Fetch metadata and history
        let data = self
            .market_data
            .fetch(&symbol, self.window, today)
            .await
            .map_err(|e| {
                warn!(%symbol, error = %e, "Market data lookup failed");
                ForecastError::DataUnavailable {
                    symbol: symbol.to_string(),
                    message: e.to_string(),
                }
            })?;

        info!(
            %symbol,
            history_points = data.history.len(),
            first = ?data.history.first_date(),
            last = ?data.history.last_date(),
            "Fetched market data"
        );
        self.presenter.present_instrument(&data.snapshot);

        // 3. Simulate off the async runtime
        let history_points = data.history.len();
        let live_quote = data.snapshot.current_price;
        let history = data.history;
        let forecaster = self.forecaster.clone();
        let presenter = Arc::clone(&self.presenter);

        let outcome = tokio::task::spawn_blocking(move || {
            let input = SimulationInput::new(&history, today).with_live_quote(live_quote);
            forecaster.run_with_cancellation(&input, &*presenter, &cancel)
        })
        .await
        .map_err(|e| ForecastError::Join {
            message: e.to_string(),
        })??;

        // 4. Present
        for warning in &outcome.warnings {
            self.presenter.present_warning(warning);
        }
        match (&outcome.summary, outcome.is_completed()) {
            (Some(summary), true) => self.presenter.present_summary(summary),
            _ => info!(%symbol, status = ?outcome.status, "Forecast not presented"),
        }

        Ok(ForecastReport {
            snapshot: data.snapshot,
            history_points,
            outcome,
        })
    }
}
