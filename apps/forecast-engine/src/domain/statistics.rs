//! Per-calendar-month log-return statistics.
//!
//! Daily log-returns are bucketed by the month of the later observation,
//! and each bucket is reduced to its mean and population variance. Months
//! without any returns keep zero statistics, which the path simulator turns
//! into a deterministic flat step.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::price_series::HistoricalPriceSeries;

/// Number of calendar months tracked.
pub const MONTHS_PER_YEAR: usize = 12;

/// Return statistics for a single calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    /// Arithmetic mean of the month's daily log-returns.
    pub mean: f64,
    /// Population variance of the month's daily log-returns.
    pub variance: f64,
    /// Number of log-returns that fell in the month.
    pub observations: usize,
}

impl MonthStats {
    /// Reduce a bucket of log-returns to its statistics.
    #[must_use]
    pub fn from_returns(returns: &[f64]) -> Self {
        if returns.is_empty() {
            return Self::default();
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            variance,
            observations: returns.len(),
        }
    }

    /// GBM drift with the Itô correction, `mean - variance / 2`.
    #[must_use]
    pub fn drift(&self) -> f64 {
        0.5f64.mul_add(-self.variance, self.mean)
    }

    /// Standard deviation of daily log-returns.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Log-return statistics for all twelve calendar months.
///
/// Index 0 is January. Every month is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturnStatistics {
    months: [MonthStats; MONTHS_PER_YEAR],
}

impl MonthlyReturnStatistics {
    /// Build statistics from a historical close series.
    ///
    /// A series with fewer than two closes yields zero statistics for every
    /// month.
    #[must_use]
    pub fn from_series(series: &HistoricalPriceSeries) -> Self {
        let closes: Vec<(NaiveDate, f64)> = series.sorted_closes().collect();

        let mut buckets: [Vec<f64>; MONTHS_PER_YEAR] = Default::default();
        for pair in closes.windows(2) {
            let (_, previous) = pair[0];
            let (day, close) = pair[1];
            buckets[day.month0() as usize].push((close / previous).ln());
        }

        Self {
            months: buckets.map(|returns| MonthStats::from_returns(&returns)),
        }
    }

    /// Build statistics directly from per-month values.
    #[must_use]
    pub const fn from_months(months: [MonthStats; MONTHS_PER_YEAR]) -> Self {
        Self { months }
    }

    /// Statistics for a zero-based month index (0 = January).
    ///
    /// # Panics
    ///
    /// Panics if `month0` is not below 12.
    #[must_use]
    pub fn month(&self, month0: usize) -> &MonthStats {
        &self.months[month0]
    }

    /// Statistics for the month containing `date`.
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> &MonthStats {
        &self.months[date.month0() as usize]
    }

    /// Iterate `(month0, stats)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &MonthStats)> {
        self.months.iter().enumerate()
    }

    /// Whether every month has zero variance (the simulation is deterministic).
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.months.iter().all(|m| m.variance == 0.0)
    }

    /// Total number of log-returns across all months.
    #[must_use]
    pub fn total_observations(&self) -> usize {
        self.months.iter().map(|m| m.observations).sum()
    }
}
