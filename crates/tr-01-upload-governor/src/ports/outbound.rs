//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Upload Governor service: a transport to
//! peers, block metadata, and a clock. Default adapters that carry no policy
//! of their own live here as well.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use shared_types::{Hash, NodeId, Timestamp};

use crate::events::GovernorError;

/// Everything the governor needs to know about a block in order to serve it.
/// Bodies never pass through this subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockMeta {
    /// Block hash (identity).
    pub hash: Hash,
    /// Serialized size on the wire.
    pub size_bytes: u64,
    /// When the block was produced.
    pub produced_at: Timestamp,
}

/// Transport operations the governor drives.
///
/// Implementations either fully complete a logical send or fail it; the
/// governor never sees partial transfers.
pub trait PeerTransport: Send + Sync {
    /// Ship one block to one peer, returning once the transport has taken
    /// full responsibility for it.
    fn send_block(&self, peer_id: NodeId, block: &BlockMeta) -> Result<(), GovernorError>;

    /// Start tearing a connection down. Completion is reported back through
    /// [`UploadGovernorApi::peer_disconnected`](crate::ports::inbound::UploadGovernorApi::peer_disconnected).
    fn disconnect(&self, peer_id: NodeId);
}

/// Block metadata lookup.
///
/// Production: the block store. Testing: `InMemoryBlockStore` (below).
pub trait BlockStoreGateway: Send + Sync {
    /// Metadata for a block, if the store has it.
    fn block_meta(&self, hash: &Hash) -> Option<BlockMeta>;

    /// Production time of the newest block the store knows about.
    fn tip_produced_at(&self) -> Option<Timestamp>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// Production transport adapters live in node-runtime/adapters.
// =============================================================================

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for tests and regtest-style runs.
///
/// Only moves when told to. Setting it backwards is allowed; all window
/// arithmetic downstream saturates instead of panicking.
#[derive(Debug)]
pub struct AdjustableTimeSource {
    now_secs: AtomicU64,
}

impl AdjustableTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now_secs: AtomicU64::new(start),
        }
    }

    /// Jump the clock to an absolute instant, forwards or backwards.
    pub fn set(&self, now: Timestamp) {
        self.now_secs.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.now_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for AdjustableTimeSource {
    fn now(&self) -> Timestamp {
        self.now_secs.load(Ordering::SeqCst)
    }
}

/// In-memory block metadata store for unit tests and light deployments.
#[derive(Debug, Default)]
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Hash, BlockMeta>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a block's metadata.
    pub fn insert(&self, meta: BlockMeta) {
        self.blocks.write().insert(meta.hash, meta);
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl BlockStoreGateway for InMemoryBlockStore {
    fn block_meta(&self, hash: &Hash) -> Option<BlockMeta> {
        self.blocks.read().get(hash).copied()
    }

    fn tip_produced_at(&self) -> Option<Timestamp> {
        self.blocks.read().values().map(|m| m.produced_at).max()
    }
}
