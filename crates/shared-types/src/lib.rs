//! # Shared Types Crate
//!
//! This crate contains the domain primitives every subsystem speaks:
//! identifiers, hashes, and timestamps.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **No Behavior**: These are plain data types; policy lives in the
//!   subsystem crates that consume them.

pub mod entities;

pub use entities::*;
