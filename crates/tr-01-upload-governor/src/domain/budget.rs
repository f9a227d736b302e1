//! Rolling-window accounting for bytes uploaded to peers.
//!
//! The tracker never reads a clock. Time is always passed in by the caller,
//! and [`UploadBudgetTracker::maybe_reset`] must run before any headroom
//! check so an expired window cannot keep denying service.

use serde::Serialize;
use shared_types::Timestamp;

use super::config::BudgetLimit;

/// One accounting window: when it began and what was spent in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetWindow {
    /// When this window began.
    pub started_at: Timestamp,
    /// Bytes charged against the budget since `started_at`.
    pub bytes_served: u64,
}

impl BudgetWindow {
    pub fn new(started_at: Timestamp) -> Self {
        Self {
            started_at,
            bytes_served: 0,
        }
    }
}

/// Advance a window past its expiry.
///
/// Returns a fresh window anchored at `now` once `window_secs` have elapsed,
/// otherwise the input unchanged. Elapsed time saturates: a clock that jumps
/// backwards reads as zero elapsed and never rotates a window early.
pub fn rotate_window(window: BudgetWindow, window_secs: u64, now: Timestamp) -> BudgetWindow {
    if now.saturating_sub(window.started_at) >= window_secs {
        BudgetWindow::new(now)
    } else {
        window
    }
}

/// Tracks upload spending against a per-window byte budget.
#[derive(Clone, Debug)]
pub struct UploadBudgetTracker {
    limit: BudgetLimit,
    window_secs: u64,
    window: BudgetWindow,
}

impl UploadBudgetTracker {
    /// Create a tracker whose first window starts at `now`.
    pub fn new(limit: BudgetLimit, window_secs: u64, now: Timestamp) -> Self {
        Self {
            limit,
            window_secs,
            window: BudgetWindow::new(now),
        }
    }

    /// Rotate the window if it has expired. Call before every headroom check.
    pub fn maybe_reset(&mut self, now: Timestamp) {
        self.window = rotate_window(self.window, self.window_secs, now);
    }

    /// Charge `n` uploaded bytes against the current window. Only completed
    /// sends are charged.
    pub fn record(&mut self, n: u64) {
        self.window.bytes_served = self.window.bytes_served.saturating_add(n);
    }

    /// Bytes still available for charged serving. Goes negative once
    /// in-flight sends overshoot the target; callers treat anything
    /// non-positive as exhausted.
    pub fn remaining(&self) -> i64 {
        let available = i128::from(self.limit.available());
        let served = i128::from(self.window.bytes_served);
        (available - served).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Whether a charged send may proceed right now.
    pub fn has_headroom(&self) -> bool {
        self.limit.is_unlimited() || self.remaining() > 0
    }

    pub fn limit(&self) -> BudgetLimit {
        self.limit
    }

    pub fn window(&self) -> BudgetWindow {
        self.window
    }

    /// Point-in-time view of the window, shaped for operators.
    pub fn status(&self, now: Timestamp) -> UploadTargetStatus {
        let limit = self.limit();
        let elapsed = now.saturating_sub(self.window.started_at);
        UploadTargetStatus {
            target_bytes: limit.max_bytes_per_window,
            reserved_bytes: limit.reserved_bytes,
            window_secs: self.window_secs,
            bytes_served: self.window.bytes_served,
            bytes_left: self.remaining().max(0) as u64,
            window_resets_in_secs: self.window_secs.saturating_sub(elapsed),
            target_reached: !limit.is_unlimited()
                && self.window.bytes_served >= limit.max_bytes_per_window,
            serve_historical: self.has_headroom(),
        }
    }
}

/// Operator-facing snapshot of the upload target state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UploadTargetStatus {
    /// Configured target in bytes for one window. Zero means uncapped.
    pub target_bytes: u64,
    /// Bytes held back from the target for new-block relay.
    pub reserved_bytes: u64,
    /// Window length in seconds.
    pub window_secs: u64,
    /// Bytes charged so far in the current window.
    pub bytes_served: u64,
    /// Charged bytes still available in the current window.
    pub bytes_left: u64,
    /// Seconds until the current window can rotate.
    pub window_resets_in_secs: u64,
    /// Whether the full target (reserve ignored) has been spent.
    pub target_reached: bool,
    /// Whether historical blocks are currently being served.
    pub serve_historical: bool,
}
