//! # Upload Governor Service
//!
//! The connection controller: takes block requests, runs them through the
//! upload policy, drives the transport, and keeps the budget window and the
//! peer registry straight.
//!
//! ## Architecture
//!
//! This service implements the inbound port:
//! - [`UploadGovernorApi`]: connection lifecycle, block requests, introspection
//!
//! It depends on three outbound ports (implemented by adapters in node-runtime):
//! - [`PeerTransport`]: sending blocks and hanging up connections
//! - [`BlockStoreGateway`]: block metadata and the tip timestamp
//! - [`TimeSource`]: the injected clock
//!
//! ## Locking
//!
//! The budget window sits behind one mutex, held only to rotate-and-check or
//! to record a completed send, never across a transport call. Concurrent
//! requests may therefore overshoot the target by the blocks already in
//! flight; the window goes negative and the arithmetic stays correct.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{
    evaluate_request, ConnectionState, GovernorConfig, PeerRecord, PeerRegistry, RecencyPolicy,
    ServeOutcome, UploadBudgetTracker, UploadDecision, UploadTargetStatus,
};
use crate::events::GovernorError;
use crate::ports::inbound::UploadGovernorApi;
use crate::ports::outbound::{BlockMeta, BlockStoreGateway, PeerTransport, TimeSource};
use shared_types::{Hash, NodeId, Timestamp};

/// Upload Governor Service.
///
/// One instance governs every connection the node serves blocks to.
///
/// ## Thread Safety
///
/// This service is thread-safe and can be shared across async tasks via
/// `Arc`. Internal state is protected by `parking_lot` locks.
///
/// ## Dependencies
///
/// Requires three port implementations:
/// - `T: PeerTransport` - block delivery and connection teardown
/// - `S: BlockStoreGateway` - block metadata lookup
/// - `C: TimeSource` - clock injection
pub struct UploadGovernorService<T, S, C>
where
    T: PeerTransport,
    S: BlockStoreGateway,
    C: TimeSource,
{
    /// Service configuration.
    config: GovernorConfig,
    /// Recency exemption derived from the configuration.
    recency: RecencyPolicy,
    /// Shared upload budget. Lock scope: check or record, never a send.
    budget: Mutex<UploadBudgetTracker>,
    /// Governed connections.
    peers: RwLock<PeerRegistry>,
    /// Transport adapter.
    transport: Arc<T>,
    /// Block metadata adapter.
    store: Arc<S>,
    /// Clock adapter.
    clock: Arc<C>,
}

impl<T, S, C> UploadGovernorService<T, S, C>
where
    T: PeerTransport,
    S: BlockStoreGateway,
    C: TimeSource,
{
    /// Create a governor whose first budget window starts now.
    pub fn new(config: GovernorConfig, transport: Arc<T>, store: Arc<S>, clock: Arc<C>) -> Self {
        let now = clock.now();
        Self {
            recency: RecencyPolicy::new(config.recent_age_limit_secs),
            budget: Mutex::new(UploadBudgetTracker::new(
                config.limit,
                config.window_secs,
                now,
            )),
            peers: RwLock::new(PeerRegistry::new()),
            config,
            transport,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Number of governed connections.
    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    /// Rotate-and-check under the budget lock.
    fn budget_has_headroom(&self, now: Timestamp) -> bool {
        let mut budget = self.budget.lock();
        budget.maybe_reset(now);
        budget.has_headroom()
    }

    /// Charge a completed send.
    fn charge(&self, bytes: u64) {
        self.budget.lock().record(bytes);
    }

    /// Reference instant for recency: the newest block the store knows,
    /// falling back to the requested block itself.
    fn recency_reference(&self, requested: &BlockMeta) -> Timestamp {
        self.store
            .tip_produced_at()
            .unwrap_or(requested.produced_at)
    }
}

impl<T, S, C> UploadGovernorApi for UploadGovernorService<T, S, C>
where
    T: PeerTransport,
    S: BlockStoreGateway,
    C: TimeSource,
{
    fn register_peer(&self, peer_id: NodeId, privileged: bool) -> Result<(), GovernorError> {
        let now = self.clock.now();
        if !self
            .peers
            .write()
            .register(PeerRecord::new(peer_id, privileged, now))
        {
            return Err(GovernorError::DuplicatePeer(peer_id));
        }
        debug!(
            "[tr-01] peer {} registered (privileged: {})",
            hex::encode(&peer_id.0[..8]),
            privileged
        );
        Ok(())
    }

    fn handle_block_request(
        &self,
        peer_id: NodeId,
        block_hash: Hash,
    ) -> Result<ServeOutcome, GovernorError> {
        let now = self.clock.now();

        let (privileged, state) = {
            let peers = self.peers.read();
            let record = peers
                .get(&peer_id)
                .ok_or(GovernorError::UnknownPeer(peer_id))?;
            (record.privileged, record.state)
        };

        if state != ConnectionState::Active {
            debug!(
                "[tr-01] ignoring request from peer {} mid-teardown",
                hex::encode(&peer_id.0[..8])
            );
            return Ok(ServeOutcome::Ignored);
        }

        let meta = self
            .store
            .block_meta(&block_hash)
            .ok_or(GovernorError::UnknownBlock(block_hash))?;

        let recent = self
            .recency
            .is_recent(meta.produced_at, self.recency_reference(&meta));
        let has_headroom = self.budget_has_headroom(now);

        match evaluate_request(privileged, recent, has_headroom) {
            UploadDecision::AllowExempt => {
                self.transport.send_block(peer_id, &meta)?;
                self.peers.write().record_served(&peer_id, meta.size_bytes);
                debug!(
                    "[tr-01] served block {} to peer {} ({} bytes, exempt)",
                    hex::encode(&block_hash[..8]),
                    hex::encode(&peer_id.0[..8]),
                    meta.size_bytes
                );
                Ok(ServeOutcome::Sent {
                    bytes: meta.size_bytes,
                })
            }
            UploadDecision::AllowCharged => {
                self.transport.send_block(peer_id, &meta)?;
                self.charge(meta.size_bytes);
                self.peers.write().record_served(&peer_id, meta.size_bytes);
                debug!(
                    "[tr-01] served block {} to peer {} ({} bytes charged)",
                    hex::encode(&block_hash[..8]),
                    hex::encode(&peer_id.0[..8]),
                    meta.size_bytes
                );
                Ok(ServeOutcome::Sent {
                    bytes: meta.size_bytes,
                })
            }
            UploadDecision::Deny => {
                // Mark first so concurrent requests see the teardown.
                self.peers.write().mark_disconnect_pending(&peer_id);
                info!(
                    "[tr-01] historical block serving limit reached, disconnecting peer {}",
                    hex::encode(&peer_id.0[..8])
                );
                self.transport.disconnect(peer_id);
                Ok(ServeOutcome::Denied)
            }
        }
    }

    fn peer_disconnected(&self, peer_id: NodeId) {
        if let Some(record) = self.peers.write().close(&peer_id) {
            debug!(
                "[tr-01] peer {} gone after {} blocks / {} bytes served",
                hex::encode(&peer_id.0[..8]),
                record.blocks_served,
                record.bytes_served
            );
        }
    }

    fn upload_status(&self) -> UploadTargetStatus {
        let now = self.clock.now();
        let mut budget = self.budget.lock();
        budget.maybe_reset(now);
        budget.status(now)
    }

    fn peer_snapshots(&self) -> Vec<PeerRecord> {
        self.peers.read().snapshot()
    }
}
