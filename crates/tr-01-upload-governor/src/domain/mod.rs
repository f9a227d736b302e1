//! # Domain Layer for Upload Governance
//!
//! Pure business logic with no I/O dependencies. This is the innermost layer
//! of the hexagonal architecture.
//!
//! ## Contents
//!
//! - **config**: Budget configuration and target parsing (`GovernorConfig`, `parse_byte_target`)
//! - **budget**: Rolling-window accounting (`UploadBudgetTracker`, `rotate_window`)
//! - **recency**: Age-based exemption (`RecencyPolicy`)
//! - **policy**: The serve/deny decision (`evaluate_request`, `ConnectionState`)
//! - **peers**: Per-connection bookkeeping (`PeerRegistry`, `PeerRecord`)
//!
//! ## Design Principles
//!
//! 1. **No I/O**: All functions are pure and synchronous
//! 2. **No Clocks**: Time is always passed in; nothing here reads the system time
//! 3. **Testable**: All logic can be unit tested without mocks

mod budget;
mod config;
mod peers;
mod policy;
mod recency;

pub use budget::*;
pub use config::*;
pub use peers::*;
pub use policy::*;
pub use recency::*;
