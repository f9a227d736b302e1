//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: The governor defines ports, this crate
//!   implements the adapters
//! - **Dependency Injection**: The container wires adapters into the service
//!   at startup
//! - **Environment Configuration**: All tunables come from `TR_*` variables
//!   with validated parsing

pub mod adapters;
pub mod container;

pub use container::{ConfigError, GovernorContainer, NodeConfig};
