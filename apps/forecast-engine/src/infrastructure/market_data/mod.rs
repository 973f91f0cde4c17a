//! Market Data Adapters
//!
//! Implementations of `MarketDataPort` backed by local files.

pub mod json_file;

pub use json_file::JsonFileMarketData;
