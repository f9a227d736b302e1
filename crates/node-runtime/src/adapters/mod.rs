//! # Adapter Implementations
//!
//! Concrete implementations of the governor's **outbound ports**:
//!
//! - [`transport::ChannelTransport`] delivers blocks and hangups over
//!   per-peer channels
//! - [`clock::NodeClock`] selects the wall clock or a pinned mock clock
//!
//! ## Hexagonal Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     OUTER LAYER (Adapters)                          │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │  ChannelTransport, NodeClock, InMemoryBlockStore              │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │                              ↑ implements ↑                         │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                    MIDDLE LAYER (Ports)                        │  │
//! │  │  trait PeerTransport, trait BlockStoreGateway, trait TimeSource│  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │                              ↑ uses ↑                               │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                    INNER LAYER (Domain)                        │  │
//! │  │  Pure budget/recency/policy logic - no I/O, no clocks          │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod transport;

pub use clock::*;
pub use transport::*;
