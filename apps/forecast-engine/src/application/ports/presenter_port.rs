//! Presenter Port (Driven Port)
//!
//! Interface for showing instrument details, batch progress, and the final
//! forecast to the user.

use crate::domain::SimulationSummary;
use crate::simulation::{ProgressSink, SimulationWarning};

use super::market_data_port::InstrumentSnapshot;

/// Port for the presentation layer.
///
/// Progress arrives through the [`ProgressSink`] supertrait, possibly from
/// worker threads.
pub trait PresenterPort: ProgressSink {
    /// Show instrument metadata before the simulation starts.
    fn present_instrument(&self, snapshot: &InstrumentSnapshot);

    /// Show a degraded-mode warning.
    fn present_warning(&self, warning: &SimulationWarning);

    /// Show the final forecast.
    fn present_summary(&self, summary: &SimulationSummary);
}
