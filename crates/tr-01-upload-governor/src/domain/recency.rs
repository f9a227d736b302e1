//! Age-based exemption from upload budgeting.
//!
//! Ages are measured against the newest known block, not the wall clock, so
//! the chain tip itself is always served no matter how far the budget is
//! overspent or where the system clock has jumped.

use shared_types::Timestamp;

/// Decides whether a block is fresh enough to bypass the upload budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecencyPolicy {
    /// Maximum age, relative to the newest block, that still counts as
    /// recent.
    pub max_age_secs: u64,
}

impl RecencyPolicy {
    pub fn new(max_age_secs: u64) -> Self {
        Self { max_age_secs }
    }

    /// Whether a block produced at `produced_at` is recent relative to
    /// `reference` (the newest known block's production time).
    ///
    /// Ages saturate at zero, so the reference block and anything newer are
    /// always recent. A block stops being recent once its age exceeds the
    /// limit.
    pub fn is_recent(&self, produced_at: Timestamp, reference: Timestamp) -> bool {
        reference.saturating_sub(produced_at) <= self.max_age_secs
    }
}
