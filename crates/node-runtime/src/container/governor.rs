//! # Governor Container
//!
//! Holds the upload governor and its adapters, wired at startup.
//!
//! ## Thread Safety
//!
//! Everything here is `Arc`-shared; session tasks clone what they need and
//! the container itself can be cloned across the runtime.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use shared_types::NodeId;
use tr_01_upload_governor::ports::outbound::InMemoryBlockStore;
use tr_01_upload_governor::{
    BudgetLimit, GovernorConfig, GovernorError, UploadGovernorApi, UploadGovernorService,
};

use crate::adapters::{ChannelTransport, NodeClock, PeerDelivery};
use crate::container::config::{NodeConfig, UploadConfig};

/// Concrete type for the governor service with runtime adapters.
pub type ConcreteGovernorService =
    UploadGovernorService<ChannelTransport, InMemoryBlockStore, NodeClock>;

/// Central container holding the governor and its adapters.
pub struct GovernorContainer {
    /// The upload governor (tr-01).
    service: Arc<ConcreteGovernorService>,
    /// Per-peer delivery channels.
    transport: Arc<ChannelTransport>,
    /// Block metadata known to this node.
    store: Arc<InMemoryBlockStore>,
    /// Injected clock.
    clock: Arc<NodeClock>,
    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl GovernorContainer {
    /// Create a container with all adapters wired into the governor.
    pub fn new(config: NodeConfig) -> Self {
        info!("Initializing Tachyon-Relay governor container");

        info!("Phase 1: Creating shared adapters");
        let transport = Arc::new(ChannelTransport::new());
        let store = Arc::new(InMemoryBlockStore::new());
        let clock = Arc::new(NodeClock::from_config(config.clock.mock_time));
        if let Some(at) = config.clock.mock_time {
            warn!("Clock pinned at {} (TR_MOCK_TIME set)", at);
        }

        info!("Phase 2: Initializing upload governor");
        let governor_config = governor_config(&config.upload);
        let service = Arc::new(UploadGovernorService::new(
            governor_config,
            Arc::clone(&transport),
            Arc::clone(&store),
            Arc::clone(&clock),
        ));

        if config.upload.max_upload_target == 0 {
            info!("  [tr-01] Upload target: unlimited");
        } else {
            info!(
                "  [tr-01] Upload target: {} bytes per {}s window, {} bytes reserved",
                config.upload.max_upload_target,
                service.config().window_secs,
                config.upload.reserve_bytes
            );
        }

        Self {
            service,
            transport,
            store,
            clock,
            config,
        }
    }

    /// Register a peer with the governor and open its delivery channel.
    pub fn connect_peer(
        &self,
        peer_id: NodeId,
        privileged: bool,
    ) -> Result<mpsc::UnboundedReceiver<PeerDelivery>, GovernorError> {
        self.service.register_peer(peer_id, privileged)?;
        Ok(self.transport.attach_peer(peer_id))
    }

    /// Note a closed connection, whichever side hung up first.
    pub fn peer_departed(&self, peer_id: NodeId) {
        self.service.peer_disconnected(peer_id);
        self.transport.detach_peer(&peer_id);
    }

    // =========================================================================
    // ACCESSOR METHODS
    // =========================================================================

    /// The governor service.
    pub fn service(&self) -> Arc<ConcreteGovernorService> {
        Arc::clone(&self.service)
    }

    /// The block store the governor reads metadata from.
    pub fn store(&self) -> Arc<InMemoryBlockStore> {
        Arc::clone(&self.store)
    }

    /// The injected clock.
    pub fn clock(&self) -> Arc<NodeClock> {
        Arc::clone(&self.clock)
    }

    /// The channel transport.
    pub fn transport(&self) -> Arc<ChannelTransport> {
        Arc::clone(&self.transport)
    }
}

/// Map node-level upload settings onto the governor's configuration.
fn governor_config(upload: &UploadConfig) -> GovernorConfig {
    GovernorConfig {
        limit: BudgetLimit {
            max_bytes_per_window: upload.max_upload_target,
            reserved_bytes: upload.reserve_bytes,
        },
        ..GovernorConfig::default()
    }
}
