//! Events and error types for the Upload Governor subsystem.
//!
//! A denial is not an error here; it is an ordinary
//! [`ServeOutcome`](crate::domain::ServeOutcome) and part of normal
//! operation. Errors are reserved for callers holding stale ids and for
//! transport failures.

use shared_types::{Hash, NodeId};
use thiserror::Error;

/// Upload governor errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GovernorError {
    /// A human-entered size string did not parse. Startup error reporting
    /// relies on this exact message shape.
    #[error("Unable to parse {option}: '{value}'")]
    InvalidByteTarget { option: String, value: String },

    #[error("Unknown peer: {0:?}")]
    UnknownPeer(NodeId),

    #[error("Peer already registered: {0:?}")]
    DuplicatePeer(NodeId),

    #[error("Unknown block: {0:?}")]
    UnknownBlock(Hash),

    #[error("Transport failure sending to peer {peer:?}: {reason}")]
    SendFailed { peer: NodeId, reason: String },
}
