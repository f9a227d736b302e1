//! # Governor Container
//!
//! Central wiring point: configuration comes in from the environment, the
//! governor service goes out with its transport, store, and clock adapters
//! injected.

pub mod config;
pub mod governor;

pub use config::{ConfigError, NodeConfig};
pub use governor::{ConcreteGovernorService, GovernorContainer};
