//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::orchestrator::RefetchScope;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Input and cache locations
    pub paths: PathsSettings,
    /// Download behaviour
    pub fetch: FetchSettings,
    /// Continuous mode timers
    pub watch: WatchSettings,
    /// Log output
    pub logging: LoggingSettings,
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq)]
pub struct PathsSettings {
    /// Compiled challenge map (JSON)
    pub challenges: PathBuf,
    /// Root of the tile cache
    pub cache_dir: PathBuf,
}

/// `[fetch]`
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    /// Tiles fetched concurrently (1..=256)
    pub batch_width: usize,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Pause after the last batch before metadata is written
    pub write_grace_ms: u64,
    /// Coordinates fetched when a cache entry is incomplete
    pub refetch: RefetchScope,
    /// Base URL for legacy panoramas
    pub legacy_base_url: String,
    /// Base URL for modern panoramas
    pub modern_base_url: String,
}

/// `[watch]`
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    /// Quiet period after challenge map changes
    pub config_debounce_ms: u64,
    /// Quiet period after cache removals
    pub cache_debounce_ms: u64,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default verbosity when `RUST_LOG` is not set
    pub level: LogLevel,
    /// Directory of the log file
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}
