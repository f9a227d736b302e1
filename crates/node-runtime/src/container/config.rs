//! # Node Configuration
//!
//! Unified configuration for the governor and runtime parameters.
//!
//! ## Sources
//!
//! All settings have defaults and can be overridden via environment
//! variables. A value that fails to parse aborts startup with
//! `Unable to parse <VAR>: '<value>'` rather than falling back silently.

use tr_01_upload_governor::parse_byte_target;

/// Environment variable holding the per-window upload target (size string).
pub const MAX_UPLOAD_TARGET_VAR: &str = "TR_MAX_UPLOAD_TARGET";
/// Environment variable holding the new-block reserve in plain bytes.
pub const UPLOAD_RESERVE_VAR: &str = "TR_UPLOAD_RESERVE_BYTES";
/// Environment variable pinning the clock to a fixed unix timestamp.
pub const MOCK_TIME_VAR: &str = "TR_MOCK_TIME";
/// Environment variable setting the status heartbeat period in seconds.
pub const STATUS_INTERVAL_VAR: &str = "TR_STATUS_INTERVAL_SECS";

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Upload governor configuration.
    pub upload: UploadConfig,
    /// Clock configuration.
    pub clock: ClockConfig,
    /// Status reporting configuration.
    pub status: StatusConfig,
}

impl NodeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup. `from_env`
    /// routes the process environment through here; tests inject maps.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = NodeConfig::default();

        if let Some(raw) = lookup(MAX_UPLOAD_TARGET_VAR) {
            config.upload.max_upload_target = parse_byte_target(MAX_UPLOAD_TARGET_VAR, &raw)
                .map_err(|_| ConfigError::invalid(MAX_UPLOAD_TARGET_VAR, &raw))?;
        }
        if let Some(raw) = lookup(UPLOAD_RESERVE_VAR) {
            config.upload.reserve_bytes = parse_plain(UPLOAD_RESERVE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(MOCK_TIME_VAR) {
            config.clock.mock_time = Some(parse_plain(MOCK_TIME_VAR, &raw)?);
        }
        if let Some(raw) = lookup(STATUS_INTERVAL_VAR) {
            config.status.interval_secs = parse_plain(STATUS_INTERVAL_VAR, &raw)?;
        }

        Ok(config)
    }
}

fn parse_plain(option: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::invalid(option, raw))
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value the parser rejected.
    InvalidOption {
        /// The offending variable.
        option: String,
        /// The raw value as supplied.
        value: String,
    },
}

impl ConfigError {
    fn invalid(option: &str, value: &str) -> Self {
        ConfigError::InvalidOption {
            option: option.to_string(),
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidOption { option, value } => {
                write!(f, "Unable to parse {}: '{}'", option, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Upload governor configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Upload target per accounting window, in bytes. Zero disables the cap.
    pub max_upload_target: u64,
    /// Bytes held back for new-block relay, never spent on historical
    /// serving.
    pub reserve_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_target: 0,            // uncapped
            reserve_bytes: 144 * 4_000_000,  // one day of new-block relay at 4 MB each
        }
    }
}

/// Clock configuration.
#[derive(Debug, Clone, Default)]
pub struct ClockConfig {
    /// When set, the node runs on a pinned clock instead of wall time.
    pub mock_time: Option<u64>,
}

/// Status reporting configuration.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Seconds between status heartbeat log lines. Zero disables the
    /// heartbeat.
    pub interval_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}
