//! Forecast Engine Binary
//!
//! Forecasts one instrument's price distribution and prints the report.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin forecast-engine -- AAPL
//! ```
//!
//! # Environment Variables
//!
//! - `FORECAST_CONFIG`: Path to the YAML config (default: config.yaml;
//!   built-in defaults when the file is absent)
//! - `FORECAST_SYMBOL`: Symbol to forecast when no argument is given
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)
//!
//! Without an argument or `FORECAST_SYMBOL` the symbol is read from stdin.
//! Ctrl+C stops the batch after the runs in flight.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, bail};
use forecast_engine::application::use_cases::RunForecastUseCase;
use forecast_engine::config::{DEFAULT_CONFIG_PATH, load_config_or_default};
use forecast_engine::error::ForecastError;
use forecast_engine::infrastructure::market_data::JsonFileMarketData;
use forecast_engine::infrastructure::presenter::ConsolePresenter;
use forecast_engine::simulation::{BatchStatus, MonteCarloForecaster};
use forecast_engine::telemetry::init_tracing;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path =
        std::env::var("FORECAST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config_or_default(Some(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;

    init_tracing(&config.observability.logging)?;
    tracing::info!(
        config = %config_path,
        data_dir = %config.market_data.data_dir.display(),
        runs = config.simulation.runs,
        horizon_days = config.simulation.horizon_days,
        "Starting forecast engine"
    );

    let symbol = read_symbol()?;

    let use_case = RunForecastUseCase::new(
        Arc::new(JsonFileMarketData::new(config.market_data.data_dir.clone())),
        Arc::new(ConsolePresenter::stdout()),
        MonteCarloForecaster::new(config.simulation.clone()),
        config.market_data.window(),
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let today = chrono::Local::now().date_naive();
    let report = match use_case.execute(&symbol, today, cancel).await {
        Ok(report) => report,
        Err(ForecastError::DataUnavailable { symbol, message }) => {
            eprintln!("Failed to fetch data for symbol: {symbol}");
            bail!("{message}");
        }
        Err(e) => return Err(e.into()),
    };

    if let BatchStatus::Aborted { completed_runs } = report.outcome.status {
        println!();
        bail!(
            "simulation cancelled after {completed_runs} of {} runs",
            config.simulation.runs
        );
    }

    Ok(())
}

/// Symbol from the first argument, `FORECAST_SYMBOL`, or a stdin prompt.
fn read_symbol() -> anyhow::Result<String> {
    if let Some(symbol) = std::env::args().nth(1) {
        return Ok(symbol);
    }
    if let Ok(symbol) = std::env::var("FORECAST_SYMBOL") {
        return Ok(symbol);
    }

    print!("Enter the stock symbol: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if signal::ctrl_c().await.is_ok() {
        tracing::info!("Received Ctrl+C, cancelling simulation");
        cancel.cancel();
    }
}

fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
