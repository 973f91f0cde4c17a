//! Reduction of simulated paths into the forecast summary.

use chrono::Month;
use serde::{Deserialize, Serialize};

use super::path::SimulatedPath;
use super::statistics::MONTHS_PER_YEAR;

/// Modelled percentage change for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyChange {
    /// Month number, 1 = January.
    pub month: u32,
    /// English month name.
    pub name: String,
    /// Mean simple change (percent) accumulated while paths were in this
    /// month. `None` when the horizon never reaches the month.
    pub pct_change: Option<f64>,
}

/// Summary of a simulation batch.
///
/// Produced once after the last run and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Price every path started from.
    pub reference_price: f64,
    /// Mean terminal price.
    pub expected_close: f64,
    /// Highest terminal price.
    pub high: f64,
    /// Lowest terminal price.
    pub low: f64,
    /// `|expected_close - reference_price| / reference_price * 100`.
    pub relative_error_pct: f64,
    /// Signed modelled change over the horizon, in percent.
    pub yearly_change_pct: f64,
    /// Point forecast shown to the user (the expected close).
    pub best_guess: f64,
    /// Error margin shown next to the best guess, in percent.
    pub error_margin_pct: f64,
    /// Modelled change per calendar month, January first.
    pub monthly_changes: Vec<MonthlyChange>,
    /// Model accuracy in percent. Not computed; always `None`.
    pub model_accuracy_pct: Option<f64>,
    /// Number of paths reduced.
    pub runs: u32,
    /// Steps per path.
    pub horizon_days: u32,
}

impl SimulationSummary {
    /// Reduce simulated paths into a summary.
    ///
    /// Returns `None` when `paths` is empty.
    #[must_use]
    pub fn from_paths(reference_price: f64, horizon_days: u32, paths: &[SimulatedPath]) -> Option<Self> {
        if paths.is_empty() {
            return None;
        }

        let n = paths.len() as f64;
        let high = paths
            .iter()
            .map(|p| p.terminal_price)
            .fold(f64::NEG_INFINITY, f64::max);
        let low = paths
            .iter()
            .map(|p| p.terminal_price)
            .fold(f64::INFINITY, f64::min);
        let mean = paths.iter().map(|p| p.terminal_price).sum::<f64>() / n;
        // Rounding in the sum can push the mean of near-identical prices
        // just outside [low, high]. With only NaN prices the bounds stay
        // inverted and the mean passes through.
        let expected_close = if low <= high { mean.clamp(low, high) } else { mean };

        let yearly_change_pct = (expected_close - reference_price) / reference_price * 100.0;
        let relative_error_pct = yearly_change_pct.abs();

        Some(Self {
            reference_price,
            expected_close,
            high,
            low,
            relative_error_pct,
            yearly_change_pct,
            best_guess: expected_close,
            error_margin_pct: relative_error_pct,
            monthly_changes: monthly_changes(paths),
            model_accuracy_pct: None,
            runs: paths.len() as u32,
            horizon_days,
        })
    }
}

fn monthly_changes(paths: &[SimulatedPath]) -> Vec<MonthlyChange> {
    (0..MONTHS_PER_YEAR)
        .map(|month0| {
            let changes: Vec<f64> = paths
                .iter()
                .filter_map(|p| p.month_pct_change(month0))
                .collect();
            let pct_change =
                (!changes.is_empty()).then(|| changes.iter().sum::<f64>() / changes.len() as f64);

            MonthlyChange {
                month: month0 as u32 + 1,
                name: month_name(month0),
                pct_change,
            }
        })
        .collect()
}

fn month_name(month0: usize) -> String {
    Month::try_from(month0 as u8 + 1)
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn path(terminal_price: f64) -> SimulatedPath {
        SimulatedPath {
            terminal_price,
            month_log_change: [0.0; MONTHS_PER_YEAR],
            month_steps: [0; MONTHS_PER_YEAR],
        }
    }

    #[test]
    fn empty_paths_have_no_summary() {
        assert!(SimulationSummary::from_paths(100.0, 252, &[]).is_none());
    }

    #[test]
    fn flat_paths_have_zero_error() {
        let paths = vec![path(50.0); 1000];
        let summary = SimulationSummary::from_paths(50.0, 252, &paths).unwrap();

        assert_eq!(summary.expected_close, 50.0);
        assert_eq!(summary.high, 50.0);
        assert_eq!(summary.low, 50.0);
        assert_eq!(summary.relative_error_pct, 0.0);
        assert_eq!(summary.yearly_change_pct, 0.0);
        assert_eq!(summary.best_guess, 50.0);
        assert_eq!(summary.runs, 1000);
    }

    #[test]
    fn reduction_uses_mean_max_min() {
        let paths = [path(90.0), path(110.0), path(130.0)];
        let summary = SimulationSummary::from_paths(100.0, 10, &paths).unwrap();

        assert!((summary.expected_close - 110.0).abs() < 1e-12);
        assert_eq!(summary.high, 130.0);
        assert_eq!(summary.low, 90.0);
        assert!((summary.relative_error_pct - 10.0).abs() < 1e-9);
        assert!((summary.yearly_change_pct - 10.0).abs() < 1e-9);
        assert_eq!(summary.error_margin_pct, summary.relative_error_pct);
    }

    #[test]
    fn negative_change_keeps_sign_but_error_is_absolute() {
        let summary = SimulationSummary::from_paths(100.0, 10, &[path(80.0)]).unwrap();

        assert!((summary.yearly_change_pct + 20.0).abs() < 1e-9);
        assert!((summary.relative_error_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn nan_terminal_prices_do_not_panic() {
        let summary = SimulationSummary::from_paths(100.0, 10, &[path(f64::NAN)]).unwrap();
        assert!(summary.expected_close.is_nan());
        assert!(summary.relative_error_pct.is_nan());

        let summary =
            SimulationSummary::from_paths(100.0, 10, &[path(f64::NAN), path(120.0)]).unwrap();
        assert_eq!(summary.high, 120.0);
        assert_eq!(summary.low, 120.0);
        assert!(summary.expected_close.is_nan());
    }

    #[test]
    fn infinite_terminal_price_is_kept() {
        let summary =
            SimulationSummary::from_paths(100.0, 10, &[path(f64::INFINITY), path(50.0)]).unwrap();
        assert_eq!(summary.high, f64::INFINITY);
        assert_eq!(summary.low, 50.0);
        assert_eq!(summary.expected_close, f64::INFINITY);
    }

    #[test]
    fn monthly_changes_average_visited_paths_only() {
        let mut a = path(100.0);
        a.month_steps[0] = 5;
        a.month_log_change[0] = 0.1f64.ln_1p();
        let mut b = path(100.0);
        b.month_steps[0] = 5;
        b.month_log_change[0] = 0.3f64.ln_1p();

        let summary = SimulationSummary::from_paths(100.0, 5, &[a, b]).unwrap();

        assert_eq!(summary.monthly_changes.len(), MONTHS_PER_YEAR);
        let january = &summary.monthly_changes[0];
        assert_eq!(january.month, 1);
        assert_eq!(january.name, "January");
        assert!((january.pct_change.unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(summary.monthly_changes[11].name, "December");
        assert!(summary.monthly_changes[1..].iter().all(|m| m.pct_change.is_none()));
        assert_eq!(summary.model_accuracy_pct, None);
    }

    proptest! {
        #[test]
        fn high_bounds_expected_bounds_low(
            prices in prop::collection::vec(0.01f64..1.0e6, 1..200),
            reference in 0.01f64..1.0e6,
        ) {
            let paths: Vec<_> = prices.iter().copied().map(path).collect();
            let summary = SimulationSummary::from_paths(reference, 252, &paths).unwrap();

            prop_assert!(summary.high >= summary.expected_close);
            prop_assert!(summary.expected_close >= summary.low);
            prop_assert!(summary.relative_error_pct >= 0.0);
        }
    }
}
