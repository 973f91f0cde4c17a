//! Console presenter.
//!
//! Writes the instrument block, an in-place progress line, and the forecast
//! report to any [`Write`] sink (stdout in the binary, a buffer in tests).

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::application::ports::{InstrumentSnapshot, PresenterPort};
use crate::domain::SimulationSummary;
use crate::simulation::{ProgressSink, SimulationWarning};

/// Presenter writing human-readable output.
#[derive(Debug)]
pub struct ConsolePresenter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsolePresenter<io::Stdout> {
    /// Presenter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsolePresenter<W> {
    /// Create a presenter over `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the presenter and return the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_with(&self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = f(&mut *out).and_then(|()| out.flush()) {
            warn!(error = %e, "Failed to write console output");
        }
    }
}

impl<W: Write + Send> ProgressSink for ConsolePresenter<W> {
    fn report_progress(&self, percent: u8) {
        self.write_with(|out| write!(out, "\rSimulation Progress: {percent}%"));
    }
}

impl<W: Write + Send> PresenterPort for ConsolePresenter<W> {
    fn present_instrument(&self, snapshot: &InstrumentSnapshot) {
        self.write_with(|out| {
            writeln!(out)?;
            writeln!(out, "Company Name: {}", snapshot.name)?;
            writeln!(out, "Symbol: {}", snapshot.symbol)?;
            writeln!(out, "Current Price: ${:.2}", snapshot.current_price)?;
            writeln!(out, "Previous Close: ${:.2}", snapshot.previous_close)?;
            writeln!(out, "Percent Changed: {:.2}%", snapshot.percent_change)?;
            writeln!(out, "Total Volume: {}", snapshot.volume)
        });
    }

    fn present_warning(&self, warning: &SimulationWarning) {
        self.write_with(|out| writeln!(out, "\nWarning: {warning}"));
    }

    fn present_summary(&self, summary: &SimulationSummary) {
        self.write_with(|out| {
            writeln!(out)?;
            writeln!(out)?;
            writeln!(out, "Calculated Close Price: ${:.2}", summary.expected_close)?;
            writeln!(out, "Calculated High Price: ${:.2}", summary.high)?;
            writeln!(out, "Calculated Low Price: ${:.2}", summary.low)?;
            writeln!(out, "Estimated Error: {:.2}%", summary.relative_error_pct)?;

            writeln!(out)?;
            writeln!(out, "Monthly Modeled Percentage Changes:")?;
            for change in &summary.monthly_changes {
                match change.pct_change {
                    Some(pct) => writeln!(out, "{}: {pct:+.2}%", change.name)?,
                    None => writeln!(out, "{}: not simulated", change.name)?,
                }
            }

            writeln!(
                out,
                "Current Year's Modeled Percentage Change: {:+.2}%",
                summary.yearly_change_pct
            )?;
            match summary.model_accuracy_pct {
                Some(accuracy) => writeln!(out, "Model's Accuracy: {accuracy:.2}%")?,
                None => writeln!(out, "Model's Accuracy: not computed")?,
            }
            writeln!(
                out,
                "Best Guess: ${:.2} \u{b1} {:.2}%",
                summary.best_guess, summary.error_margin_pct
            )
        });
    }
}
