//! Market data source configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::application::ports::TrailingWindow;

/// Where instrument files are read from and how much history is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Directory holding one `<SYMBOL>.json` file per instrument.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Length of the trailing history window in years.
    #[serde(default = "default_trailing_years")]
    pub trailing_years: u32,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            trailing_years: default_trailing_years(),
        }
    }
}

impl MarketDataConfig {
    /// Trailing window described by this configuration.
    #[must_use]
    pub const fn window(&self) -> TrailingWindow {
        TrailingWindow::years(self.trailing_years)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_trailing_years() -> u32 {
    3
}
