//! Historical close series and the ticker symbol value object.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Maximum accepted symbol length.
const MAX_SYMBOL_LEN: usize = 12;

/// A ticker symbol, trimmed and normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a raw symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidSymbol`] if the symbol is empty, too
    /// long, or contains characters other than ASCII letters, digits, `.`
    /// and `-`.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_uppercase();

        let invalid = |message: &str| ForecastError::InvalidSymbol {
            symbol: raw.to_string(),
            message: message.to_string(),
        };

        if normalized.is_empty() {
            return Err(invalid("symbol cannot be empty"));
        }
        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(invalid("symbol exceeds maximum length"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(invalid("symbol contains invalid characters"));
        }

        Ok(Self(normalized))
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Daily closing prices keyed by calendar date.
///
/// At most one close per date; non-trading days are simply absent. Every
/// close is validated to be positive and finite at construction, so the
/// engine never sees a partially valid series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPriceSeries {
    closes: BTreeMap<NaiveDate, f64>,
}

impl HistoricalPriceSeries {
    /// Build a series from `(date, close)` observations in any order.
    ///
    /// When a date appears more than once the later observation wins.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidPrice`] for the first non-positive or
    /// non-finite close.
    pub fn new<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let closes = points
            .into_iter()
            .map(|(date, price)| {
                if price.is_finite() && price > 0.0 {
                    Ok((date, price))
                } else {
                    Err(ForecastError::InvalidPrice { date, price })
                }
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { closes })
    }

    /// Build a series of consecutive calendar-day closes starting at `start`.
    ///
    /// # Errors
    ///
    /// Same as [`HistoricalPriceSeries::new`].
    pub fn from_daily_closes<I>(start: NaiveDate, closes: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(start.iter_days().zip(closes))
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Whether the series holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Highest close in the series.
    #[must_use]
    pub fn max_close(&self) -> Option<f64> {
        self.closes.values().copied().reduce(f64::max)
    }

    /// Observations in ascending date order.
    pub fn sorted_closes(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.closes.iter().map(|(date, close)| (*date, *close))
    }

    /// Earliest observation date.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.closes.keys().next().copied()
    }

    /// Latest observation date.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.closes.keys().next_back().copied()
    }

    /// Copy of the series restricted to `start..=end`.
    #[must_use]
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::default();
        }
        Self {
            closes: self.closes.range(start..=end).map(|(d, c)| (*d, *c)).collect(),
        }
    }
}
