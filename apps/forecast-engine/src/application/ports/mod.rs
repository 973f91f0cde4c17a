//! Application Ports (Driven)
//!
//! Ports define interfaces for the external systems around the engine:
//! where market data comes from and where results are shown.

mod market_data_port;
mod presenter_port;

#[cfg(test)]
pub use market_data_port::MockMarketDataPort;
pub use market_data_port::{
    InMemoryMarketData, InstrumentSnapshot, MarketData, MarketDataError, MarketDataPort,
    TrailingWindow,
};
pub use presenter_port::PresenterPort;
