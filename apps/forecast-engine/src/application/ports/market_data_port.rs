//! Market Data Port (Driven Port)
//!
//! Interface for obtaining instrument metadata and a trailing window of
//! daily closes. A lookup either yields a complete series or fails; the
//! engine never sees a partially populated history.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{HistoricalPriceSeries, Symbol};

/// Display metadata for an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    /// Company or instrument name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Live quote.
    pub current_price: f64,
    /// Previous session close.
    pub previous_close: f64,
    /// Change versus previous close, in percent.
    pub percent_change: f64,
    /// Session volume.
    pub volume: u64,
}

/// Metadata plus the trailing close history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Display metadata.
    pub snapshot: InstrumentSnapshot,
    /// Daily closes within the requested window.
    pub history: HistoricalPriceSeries,
}

/// Length of the trailing history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingWindow {
    /// Window length in years.
    pub years: u32,
}

impl Default for TrailingWindow {
    fn default() -> Self {
        Self { years: 3 }
    }
}

impl TrailingWindow {
    /// Create a window of `years` years.
    #[must_use]
    pub const fn years(years: u32) -> Self {
        Self { years }
    }

    /// First date inside the window ending on `today`.
    #[must_use]
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Market data error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDataError {
    /// The provider does not know the symbol.
    #[error("No market data found for symbol {symbol}")]
    NotFound {
        /// Requested symbol.
        symbol: String,
    },

    /// The provider could not serve the request.
    #[error("Market data unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// The provider returned data that could not be decoded.
    #[error("Malformed market data in '{path}': {message}")]
    Malformed {
        /// Source of the data.
        path: String,
        /// Error details.
        message: String,
    },
}

/// Port for market data retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch metadata and closes within `window` ending on `today`.
    async fn fetch(
        &self,
        symbol: &Symbol,
        window: TrailingWindow,
        today: NaiveDate,
    ) -> Result<MarketData, MarketDataError>;
}

/// In-memory implementation for testing and embedding.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    instruments: RwLock<HashMap<Symbol, MarketData>>,
}

impl InMemoryMarketData {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an instrument.
    pub fn insert(&self, data: MarketData) {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        instruments.insert(data.snapshot.symbol.clone(), data);
    }
}

#[async_trait]
impl MarketDataPort for InMemoryMarketData {
    async fn fetch(
        &self,
        symbol: &Symbol,
        window: TrailingWindow,
        today: NaiveDate,
    ) -> Result<MarketData, MarketDataError> {
        let instruments = self
            .instruments
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let data = instruments
            .get(symbol)
            .ok_or_else(|| MarketDataError::NotFound {
                symbol: symbol.to_string(),
            })?;

        let start = window.start_date(today);
        let history = data.history.between(start, today);
        if history.is_empty() {
            return Err(MarketDataError::Unavailable {
                message: format!("no closes for {symbol} between {start} and {today}"),
            });
        }

        Ok(MarketData {
            snapshot: data.snapshot.clone(),
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(symbol: &str) -> MarketData {
        let symbol = Symbol::parse(symbol).unwrap();
        MarketData {
            snapshot: InstrumentSnapshot {
                name: "Sample Corp".to_string(),
                symbol,
                current_price: 12.5,
                previous_close: 12.0,
                percent_change: 4.17,
                volume: 1_000,
            },
            history: HistoricalPriceSeries::new([
                (date(2020, 1, 2), 10.0),
                (date(2023, 6, 1), 11.0),
                (date(2024, 6, 3), 12.0),
            ])
            .unwrap(),
        }
    }

    #[test]
    fn trailing_window_start_date() {
        let window = TrailingWindow::default();
        assert_eq!(window.start_date(date(2024, 6, 15)), date(2021, 6, 15));
        assert_eq!(
            TrailingWindow::years(1).start_date(date(2024, 2, 29)),
            date(2023, 2, 28)
        );
    }

    #[tokio::test]
    async fn in_memory_fetch_applies_window() {
        let provider = InMemoryMarketData::new();
        provider.insert(sample("SMPL"));

        let data = provider
            .fetch(
                &Symbol::parse("smpl").unwrap(),
                TrailingWindow::default(),
                date(2024, 6, 15),
            )
            .await
            .unwrap();

        assert_eq!(data.snapshot.name, "Sample Corp");
        assert_eq!(data.history.len(), 2);
        assert_eq!(data.history.first_date(), Some(date(2023, 6, 1)));
    }

    #[tokio::test]
    async fn in_memory_empty_window_is_unavailable() {
        let provider = InMemoryMarketData::new();
        let mut data = sample("OLD");
        data.history = HistoricalPriceSeries::new([
            (date(2010, 3, 1), 10.0),
            (date(2010, 3, 2), 11.0),
        ])
        .unwrap();
        provider.insert(data);

        let result = provider
            .fetch(
                &Symbol::parse("OLD").unwrap(),
                TrailingWindow::default(),
                date(2024, 6, 1),
            )
            .await;

        assert!(matches!(result, Err(MarketDataError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn in_memory_unknown_symbol_not_found() {
        let provider = InMemoryMarketData::new();

        let result = provider
            .fetch(
                &Symbol::parse("NOPE").unwrap(),
                TrailingWindow::default(),
                date(2024, 6, 15),
            )
            .await;

        assert_eq!(
            result,
            Err(MarketDataError::NotFound {
                symbol: "NOPE".to_string()
            })
        );
    }
}
