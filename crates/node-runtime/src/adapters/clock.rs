//! Clock adapter selecting wall time or a pinned mock clock.

use shared_types::Timestamp;
use tr_01_upload_governor::ports::outbound::{
    AdjustableTimeSource, SystemTimeSource, TimeSource,
};

/// Time source for the running node.
///
/// Production nodes run on the wall clock. Replay and soak setups pin the
/// clock via `TR_MOCK_TIME` and step it explicitly.
pub enum NodeClock {
    /// Wall clock.
    System(SystemTimeSource),
    /// Pinned clock, stepped by the operator.
    Mock(AdjustableTimeSource),
}

impl NodeClock {
    /// Select the source from configuration.
    pub fn from_config(mock_time: Option<Timestamp>) -> Self {
        match mock_time {
            Some(at) => NodeClock::Mock(AdjustableTimeSource::new(at)),
            None => NodeClock::System(SystemTimeSource::default()),
        }
    }

    /// The adjustable source, when running pinned.
    pub fn mock(&self) -> Option<&AdjustableTimeSource> {
        match self {
            NodeClock::Mock(source) => Some(source),
            NodeClock::System(_) => None,
        }
    }
}

impl TimeSource for NodeClock {
    fn now(&self) -> Timestamp {
        match self {
            NodeClock::System(source) => source.now(),
            NodeClock::Mock(source) => source.now(),
        }
    }
}
