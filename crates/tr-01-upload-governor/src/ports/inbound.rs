//! Inbound ports (API) for the Upload Governor subsystem.

use crate::domain::{PeerRecord, ServeOutcome, UploadTargetStatus};
use crate::events::GovernorError;
use shared_types::{Hash, NodeId};

/// Primary API for governed block serving.
///
/// Implemented by [`UploadGovernorService`](crate::service::UploadGovernorService).
/// The connection acceptance layer drives the lifecycle methods; whatever
/// answers peer `getdata`-style requests drives `handle_block_request`.
pub trait UploadGovernorApi: Send + Sync {
    /// Admit a connection to governed serving.
    ///
    /// `privileged` grants the download permission: such peers are never
    /// denied and never disconnected by the governor.
    fn register_peer(&self, peer_id: NodeId, privileged: bool) -> Result<(), GovernorError>;

    /// Handle one block request from a registered peer.
    ///
    /// Allowed requests are pushed through the transport before this
    /// returns; a denial marks the peer disconnect-pending and asks the
    /// transport to hang up. Denials are outcomes, not errors.
    fn handle_block_request(
        &self,
        peer_id: NodeId,
        block_hash: Hash,
    ) -> Result<ServeOutcome, GovernorError>;

    /// Note that a connection is gone: the transport finished the teardown
    /// the governor asked for, or the remote side hung up. Drops the record.
    fn peer_disconnected(&self, peer_id: NodeId);

    /// Current window accounting, rotated before it is read.
    fn upload_status(&self) -> UploadTargetStatus;

    /// Clone of every governed peer record.
    fn peer_snapshots(&self) -> Vec<PeerRecord>;
}
