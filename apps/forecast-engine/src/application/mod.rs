//! Application Layer
//!
//! The application layer orchestrates the domain and simulation core
//! through use cases. It defines:
//!
//! - **Ports**: Interfaces for market data and presentation
//! - **Use Cases**: The forecast request flow

pub mod ports;
pub mod use_cases;

pub use ports::*;
pub use use_cases::*;
