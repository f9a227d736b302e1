//! The serve/deny decision and the connection lifecycle it drives.
//!
//! Three facts go in, one decision comes out; everything here is pure.

use serde::Serialize;

/// What to do with a block request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadDecision {
    /// Send without touching the shared budget window.
    AllowExempt,
    /// Send, then charge the window once the transport confirms completion.
    AllowCharged,
    /// Refuse the request and tear the connection down.
    Deny,
}

/// Lifecycle of a governed peer connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// Serving normally.
    Active,
    /// Denied; waiting for the transport to confirm the teardown.
    DisconnectPending,
    /// Torn down; the record is dropped at this point.
    Disconnected,
}

/// What actually happened to a block request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServeOutcome {
    /// The block went out; `bytes` is its serialized size.
    Sent { bytes: u64 },
    /// Refused; the connection is being torn down.
    Denied,
    /// Dropped: the peer is already mid-teardown.
    Ignored,
}

/// Decide how to handle a block request.
///
/// The check order is load-bearing:
/// 1. peers with the download permission are always served, uncharged;
/// 2. recent blocks are always served, uncharged;
/// 3. everything else is served only while the window has headroom.
///
/// A denial is terminal for the connection; there is no re-allow path.
pub fn evaluate_request(privileged: bool, recent: bool, has_headroom: bool) -> UploadDecision {
    if privileged || recent {
        UploadDecision::AllowExempt
    } else if has_headroom {
        UploadDecision::AllowCharged
    } else {
        UploadDecision::Deny
    }
}
