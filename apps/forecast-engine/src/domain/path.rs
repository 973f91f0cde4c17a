//! Geometric Brownian motion path integration with a monthly regime.
//!
//! Each step looks up the statistics of the cursor's calendar month,
//! applies `price *= exp(drift + std_dev * z)` with `z ~ N(0, 1)`, then
//! advances the cursor according to the [`HorizonModel`].

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::statistics::{MONTHS_PER_YEAR, MonthlyReturnStatistics};

/// How one simulation step maps onto the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonModel {
    /// Every calendar day is a step, weekends and holidays included.
    #[default]
    CalendarDays,
    /// Steps land on weekdays only. Exchange holidays are not modelled.
    TradingDays,
}

impl HorizonModel {
    /// The cursor date following `date`.
    #[must_use]
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        let mut next = next_day(date);
        if self == Self::TradingDays {
            while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
                next = next_day(next);
            }
        }
        next
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Outcome of a single simulated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPath {
    /// Price after the final step.
    pub terminal_price: f64,
    /// Sum of log increments applied while the cursor was in each month.
    pub month_log_change: [f64; MONTHS_PER_YEAR],
    /// Number of steps taken in each month.
    pub month_steps: [u32; MONTHS_PER_YEAR],
}

impl SimulatedPath {
    fn flat(price: f64) -> Self {
        Self {
            terminal_price: price,
            month_log_change: [0.0; MONTHS_PER_YEAR],
            month_steps: [0; MONTHS_PER_YEAR],
        }
    }

    /// Simple percentage change accumulated in a month, if the path visited it.
    #[must_use]
    pub fn month_pct_change(&self, month0: usize) -> Option<f64> {
        (self.month_steps[month0] > 0).then(|| self.month_log_change[month0].exp_m1() * 100.0)
    }
}

/// Simulates price paths from fixed monthly statistics.
#[derive(Debug, Clone, Copy)]
pub struct PathSimulator<'a> {
    statistics: &'a MonthlyReturnStatistics,
    horizon_model: HorizonModel,
}

impl<'a> PathSimulator<'a> {
    /// Create a simulator over shared statistics.
    #[must_use]
    pub const fn new(statistics: &'a MonthlyReturnStatistics, horizon_model: HorizonModel) -> Self {
        Self {
            statistics,
            horizon_model,
        }
    }

    /// Integrate one path of `days` steps starting at `start_date`.
    ///
    /// `start_price` must be positive; callers validate it. With `days == 0`
    /// the start price is returned unchanged. Months with zero variance take
    /// a drift-only step without drawing from `rng`.
    pub fn simulate<R>(
        &self,
        start_price: f64,
        days: u32,
        start_date: NaiveDate,
        rng: &mut R,
    ) -> SimulatedPath
    where
        R: Rng + ?Sized,
    {
        let mut path = SimulatedPath::flat(start_price);
        let mut price = start_price;
        let mut cursor = start_date;

        for _ in 0..days {
            let month0 = cursor.month0() as usize;
            let stats = self.statistics.month(month0);

            let shock = if stats.variance > 0.0 {
                let z: f64 = rng.sample(StandardNormal);
                stats.std_dev() * z
            } else {
                0.0
            };
            let increment = stats.drift() + shock;

            price *= increment.exp();
            path.month_log_change[month0] += increment;
            path.month_steps[month0] += 1;
            cursor = self.horizon_model.advance(cursor);
        }

        path.terminal_price = price;
        path
    }

    /// Integrate one path and keep only its terminal price.
    pub fn simulate_terminal_price<R>(
        &self,
        start_price: f64,
        days: u32,
        start_date: NaiveDate,
        rng: &mut R,
    ) -> f64
    where
        R: Rng + ?Sized,
    {
        self.simulate(start_price, days, start_date, rng)
            .terminal_price
    }
}
