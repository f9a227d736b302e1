//! Configuration value objects and upload-target parsing.

use crate::events::GovernorError;

/// Byte budget for one upload window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetLimit {
    /// Total bytes the node is willing to upload per window. Zero disables
    /// the cap.
    pub max_bytes_per_window: u64,
    /// Headroom kept back for relaying new blocks; never spent on
    /// historical serving.
    pub reserved_bytes: u64,
}

impl BudgetLimit {
    /// Whether budget checks always allow.
    pub fn is_unlimited(&self) -> bool {
        self.max_bytes_per_window == 0
    }

    /// Bytes actually available for historical serving.
    pub fn available(&self) -> u64 {
        self.max_bytes_per_window.saturating_sub(self.reserved_bytes)
    }
}

/// Upload governor configuration.
#[derive(Clone, Debug)]
pub struct GovernorConfig {
    /// Upload budget per window.
    pub limit: BudgetLimit,
    /// Length of the accounting window in seconds.
    pub window_secs: u64,
    /// Blocks at most this much older than the tip are served without
    /// charging the budget.
    pub recent_age_limit_secs: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            limit: BudgetLimit {
                max_bytes_per_window: 0,         // uncapped
                reserved_bytes: 144 * 4_000_000, // one day of new-block relay at 4 MB each
            },
            window_secs: 24 * 60 * 60,
            recent_age_limit_secs: 7 * 24 * 60 * 60, // one week
        }
    }
}

/// Parse a human-entered upload target such as `"800M"` into bytes.
///
/// A bare integer is read as MiB. Recognized suffixes are `k`/`K`, `m`/`M`,
/// `g`/`G`, `t`/`T` for powers of 1024. `"0"` disables the cap.
///
/// # Errors
///
/// [`GovernorError::InvalidByteTarget`] carrying `option` and the raw value.
/// Signs, whitespace, decimals, unknown suffixes, and overflowing
/// multiplications all fail; the message shape is relied on by startup
/// error reporting.
pub fn parse_byte_target(option: &str, raw: &str) -> Result<u64, GovernorError> {
    let err = || GovernorError::InvalidByteTarget {
        option: option.to_string(),
        value: raw.to_string(),
    };

    if raw.is_empty() {
        return Err(err());
    }

    let (digits, multiplier): (&str, u64) = match raw.as_bytes()[raw.len() - 1] {
        b'k' | b'K' => (&raw[..raw.len() - 1], 1 << 10),
        b'm' | b'M' => (&raw[..raw.len() - 1], 1 << 20),
        b'g' | b'G' => (&raw[..raw.len() - 1], 1 << 30),
        b't' | b'T' => (&raw[..raw.len() - 1], 1 << 40),
        b'0'..=b'9' => (raw, 1 << 20), // bare integers are MiB
        _ => return Err(err()),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    let count: u64 = digits.parse().map_err(|_| err())?;
    count.checked_mul(multiplier).ok_or_else(err)
}
