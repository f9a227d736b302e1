//! Per-connection bookkeeping for the peers the governor serves.
//!
//! One record per connected peer, keyed by node id. The served counters are
//! introspection only; they never feed back into budget decisions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;
use shared_types::{NodeId, Timestamp};

use super::policy::ConnectionState;

/// Per-connection bookkeeping.
#[derive(Clone, Debug, Serialize)]
pub struct PeerRecord {
    /// The peer this record belongs to.
    pub peer_id: NodeId,
    /// Download permission: exempts the peer from budgeting entirely.
    pub privileged: bool,
    /// When the connection registered with the governor.
    pub connected_at: Timestamp,
    /// Where the connection is in its lifecycle.
    pub state: ConnectionState,
    /// Blocks successfully sent to this peer.
    pub blocks_served: u64,
    /// Bytes successfully sent to this peer, exempt sends included.
    pub bytes_served: u64,
}

impl PeerRecord {
    pub fn new(peer_id: NodeId, privileged: bool, connected_at: Timestamp) -> Self {
        Self {
            peer_id,
            privileged,
            connected_at,
            state: ConnectionState::Active,
            blocks_served: 0,
            bytes_served: 0,
        }
    }
}

/// All peers currently known to the governor.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    records: HashMap<NodeId, PeerRecord>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Insert a new record. Returns false if the peer is already registered.
    pub fn register(&mut self, record: PeerRecord) -> bool {
        match self.records.entry(record.peer_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn get(&self, peer_id: &NodeId) -> Option<&PeerRecord> {
        self.records.get(peer_id)
    }

    /// Flip a peer into the disconnect-pending state.
    pub fn mark_disconnect_pending(&mut self, peer_id: &NodeId) {
        if let Some(record) = self.records.get_mut(peer_id) {
            record.state = ConnectionState::DisconnectPending;
        }
    }

    /// Bump the served counters after a completed send.
    pub fn record_served(&mut self, peer_id: &NodeId, bytes: u64) {
        if let Some(record) = self.records.get_mut(peer_id) {
            record.blocks_served += 1;
            record.bytes_served = record.bytes_served.saturating_add(bytes);
        }
    }

    /// Drop a record once its teardown is confirmed (or the remote side hung
    /// up). Returns the final record, marked `Disconnected`.
    pub fn close(&mut self, peer_id: &NodeId) -> Option<PeerRecord> {
        self.records.remove(peer_id).map(|mut record| {
            record.state = ConnectionState::Disconnected;
            record
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clone of every record, for introspection.
    pub fn snapshot(&self) -> Vec<PeerRecord> {
        self.records.values().cloned().collect()
    }
}
