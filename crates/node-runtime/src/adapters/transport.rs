//! Channel-backed transport adapter.
//!
//! Each governed peer gets an unbounded outbox; the session task owning the
//! receiving end writes deliveries to the socket. A [`PeerDelivery::Hangup`]
//! tells the session to close the connection, after which it reports back
//! via [`UploadGovernorApi::peer_disconnected`].
//!
//! [`UploadGovernorApi::peer_disconnected`]:
//! tr_01_upload_governor::UploadGovernorApi::peer_disconnected

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use shared_types::NodeId;
use tr_01_upload_governor::ports::outbound::{BlockMeta, PeerTransport};
use tr_01_upload_governor::GovernorError;

/// One item on a peer's outbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerDelivery {
    /// A block to write to the wire.
    Block(BlockMeta),
    /// Close the connection after draining.
    Hangup,
}

/// Transport that fans blocks out to per-peer channels.
#[derive(Default)]
pub struct ChannelTransport {
    outboxes: RwLock<HashMap<NodeId, mpsc::UnboundedSender<PeerDelivery>>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an outbox for a connected peer and hand back the receiving end.
    ///
    /// A reconnecting peer replaces any stale channel left under the same id.
    pub fn attach_peer(&self, peer_id: NodeId) -> mpsc::UnboundedReceiver<PeerDelivery> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outboxes.write().insert(peer_id, tx);
        debug!("[tr-01] outbox attached for peer {}", hex::encode(&peer_id.0[..8]));
        rx
    }

    /// Drop a peer's outbox without queueing a hangup. Used when the remote
    /// side closed first.
    pub fn detach_peer(&self, peer_id: &NodeId) {
        self.outboxes.write().remove(peer_id);
    }

    /// Number of peers currently holding an outbox.
    pub fn attached_peers(&self) -> usize {
        self.outboxes.read().len()
    }
}

impl PeerTransport for ChannelTransport {
    fn send_block(&self, peer_id: NodeId, block: &BlockMeta) -> Result<(), GovernorError> {
        let outboxes = self.outboxes.read();
        let outbox = outboxes
            .get(&peer_id)
            .ok_or_else(|| GovernorError::SendFailed {
                peer: peer_id,
                reason: "no outbox attached".to_string(),
            })?;

        outbox
            .send(PeerDelivery::Block(*block))
            .map_err(|_| GovernorError::SendFailed {
                peer: peer_id,
                reason: "outbox closed".to_string(),
            })
    }

    fn disconnect(&self, peer_id: NodeId) {
        // Remove first so nothing is queued behind the hangup; the receiver
        // still drains everything already sent.
        if let Some(outbox) = self.outboxes.write().remove(&peer_id) {
            let _ = outbox.send(PeerDelivery::Hangup);
        }
    }
}
