//! # Tachyon-Relay Node Runtime
//!
//! The main entry point for the Tachyon-Relay block-relay node.
//!
//! ## Architecture
//!
//! The node serves blocks to peers under a rolling upload budget. Every
//! serving decision flows through the upload governor (tr-01):
//!
//! ```text
//! block request ──→ UploadGovernorService
//!                         │
//!           ┌─────────────┼─────────────────┐
//!           ↓             ↓                 ↓
//!      privileged?     recent?         budget left?
//!           │             │                 │
//!           └── allow uncharged ────────────┤
//!                                           ├── allow + charge
//!                                           └── deny + hang up
//! ```
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and dependency injection
//! - `adapters/` - Port implementations (transport, clock)
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `TR_*` environment variables
//! 2. Abort with `Error: Unable to parse <VAR>: '<value>'` on bad input
//! 3. Wire the governor with its transport, store, and clock adapters
//! 4. Start the status heartbeat
//! 5. Serve until Ctrl+C, then shut down gracefully

pub mod adapters;
pub mod container;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tr_01_upload_governor::UploadGovernorApi;

use crate::container::{GovernorContainer, NodeConfig};

/// The main node runtime orchestrating the governor lifecycle.
pub struct NodeRuntime {
    /// Governor container with all adapters wired.
    container: Arc<GovernorContainer>,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Create a new node runtime with configuration.
    pub fn new(config: NodeConfig) -> Self {
        info!("Creating Tachyon-Relay node runtime");

        let container = Arc::new(GovernorContainer::new(config));
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Self {
            container,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start the node runtime.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Tachyon-Relay Node Runtime v0.1.0");
        info!("  Upload governor: tr-01");
        info!("===========================================");

        self.start_status_heartbeat();

        info!("Upload governor initialized and running");
        Ok(())
    }

    /// Spawn the periodic status heartbeat.
    ///
    /// Every tick logs the upload-target status as one JSON line, the same
    /// shape introspection callers get from
    /// [`UploadGovernorApi::upload_status`].
    fn start_status_heartbeat(&self) {
        let interval_secs = self.container.config.status.interval_secs;
        if interval_secs == 0 {
            info!("Status heartbeat disabled (TR_STATUS_INTERVAL_SECS=0)");
            return;
        }

        let service = self.container.service();
        let mut shutdown = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick completes immediately; skip it so the banner
            // is not followed by an all-zero status line.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let status = service.upload_status();
                        match serde_json::to_string(&status) {
                            Ok(json) => info!(
                                "[tr-01] upload target status: {} ({} peers)",
                                json,
                                service.peer_count()
                            ),
                            Err(e) => warn!("[tr-01] status encode failed: {}", e),
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("[tr-01] Shutdown signal received");
                        break;
                    }
                }
            }
        });
    }

    /// Shutdown the node gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            warn!("Failed to send shutdown signal: {}", e);
        }

        // Give the heartbeat time to observe the signal.
        tokio::time::sleep(Duration::from_millis(250)).await;

        info!("Shutdown complete");
    }

    /// Get a reference to the governor container.
    pub fn container(&self) -> Arc<GovernorContainer> {
        Arc::clone(&self.container)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration. A malformed variable aborts startup here with
    // `Error: Unable to parse <VAR>: '<value>'` on stderr.
    let config = NodeConfig::from_env()?;

    // Create and start the node runtime
    let runtime = NodeRuntime::new(config);
    runtime.start().await?;

    // Keep the node running
    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
