//! # Upload Governor Subsystem (tr-01)
//!
//! Keeps the node's outbound block serving under a configurable daily byte
//! target so one archival peer cannot eat the entire upload pipe. Applies to
//! historical blocks only; new-block relay rides on a reserved slice of the
//! target and is never throttled here.
//!
//! ## Architecture Role
//!
//! ```text
//! [Peer Connection] ──BlockRequest──→ [Upload Governor (tr-01)]
//!                                             │
//!                        privileged? recent? headroom left?
//!                                             │
//!                             ┌───────────────┴───────────────┐
//!                             ↓                               ↓
//!                    [send, charge window]          [deny, disconnect peer]
//! ```
//!
//! ## Guarantees
//!
//! - Peers with the download permission are never denied or disconnected here
//! - The newest block is always served, even with the target overspent
//! - Exempt sends never consume budget headroom
//! - All window arithmetic saturates; clock jumps never panic or reset early

pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::*;
pub use events::GovernorError;
pub use ports::inbound::UploadGovernorApi;
pub use service::UploadGovernorService;
