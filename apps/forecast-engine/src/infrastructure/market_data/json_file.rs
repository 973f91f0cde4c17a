//! JSON file market data adapter.
//!
//! Reads one `<SYMBOL>.json` file per instrument from a data directory:
//!
//! ```json
//! {
//!   "snapshot": {
//!     "name": "Acme Corp",
//!     "current_price": 101.5,
//!     "previous_close": 100.0,
//!     "percent_change": 1.5,
//!     "volume": 1200000
//!   },
//!   "closes": [
//!     { "date": "2024-01-02", "close": 99.1 },
//!     { "date": "2024-01-03", "close": 100.0 }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{
    InstrumentSnapshot, MarketData, MarketDataError, MarketDataPort, TrailingWindow,
};
use crate::domain::{HistoricalPriceSeries, Symbol};

#[derive(Debug, Deserialize)]
struct InstrumentFile {
    snapshot: SnapshotRecord,
    #[serde(default)]
    closes: Vec<CloseRecord>,
}

#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    name: String,
    current_price: f64,
    previous_close: f64,
    percent_change: f64,
    #[serde(default)]
    volume: u64,
}

#[derive(Debug, Deserialize)]
struct CloseRecord {
    date: NaiveDate,
    close: f64,
}

/// Market data provider reading instrument files from a directory.
#[derive(Debug, Clone)]
pub struct JsonFileMarketData {
    data_dir: PathBuf,
}

impl JsonFileMarketData {
    /// Create a provider rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory instrument files are read from.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File holding `symbol`'s data.
    #[must_use]
    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.data_dir.join(format!("{}.json", symbol.as_str()))
    }
}

#[async_trait]
impl MarketDataPort for JsonFileMarketData {
    async fn fetch(
        &self,
        symbol: &Symbol,
        window: TrailingWindow,
        today: NaiveDate,
    ) -> Result<MarketData, MarketDataError> {
        let path = self.path_for(symbol);
        let display_path = path.display().to_string();

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MarketDataError::NotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                MarketDataError::Unavailable {
                    message: format!("failed to read '{display_path}': {e}"),
                }
            }
        })?;

        let file: InstrumentFile =
            serde_json::from_str(&contents).map_err(|e| MarketDataError::Malformed {
                path: display_path.clone(),
                message: e.to_string(),
            })?;

        let start = window.start_date(today);
        let history = HistoricalPriceSeries::new(
            file.closes
                .into_iter()
                .filter(|c| c.date >= start && c.date <= today)
                .map(|c| (c.date, c.close)),
        )
        .map_err(|e| MarketDataError::Malformed {
            path: display_path.clone(),
            message: e.to_string(),
        })?;

        if history.is_empty() {
            return Err(MarketDataError::Unavailable {
                message: format!("no closes for {symbol} between {start} and {today}"),
            });
        }

        debug!(%symbol, path = %display_path, closes = history.len(), "Loaded instrument file");

        Ok(MarketData {
            snapshot: InstrumentSnapshot {
                name: file.snapshot.name,
                symbol: symbol.clone(),
                current_price: file.snapshot.current_price,
                previous_close: file.snapshot.previous_close,
                percent_change: file.snapshot.percent_change,
                volume: file.snapshot.volume,
            },
            history,
        })
    }
}
