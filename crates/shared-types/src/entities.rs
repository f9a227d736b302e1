//! # Core Domain Entities
//!
//! Defines the primitive identifiers shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Chain**: `Hash`, `Timestamp`
//! - **Networking**: `NodeId`, `PeerId`

use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte hash (e.g., SHA-256 or Blake3).
pub type Hash = [u8; 32];

/// Unix timestamp in seconds.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER B: NETWORKING
// =============================================================================

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

/// A peer identifier (alias for `NodeId` in peer contexts).
pub type PeerId = NodeId;
