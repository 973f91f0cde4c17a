//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer:
//!
//! - `market_data/`: File-backed instrument data
//! - `presenter/`: Console output

pub mod market_data;
pub mod presenter;
