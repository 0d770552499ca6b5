//! Default values for every configuration setting.

use std::path::PathBuf;
use std::time::Duration;

use super::settings::*;
use crate::fetcher::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};
use crate::logging::LogLevel;
use crate::orchestrator::{RefetchScope, SyncConfig, DEFAULT_BATCH_WIDTH};
use crate::provider::{TileUrlBuilder, DEFAULT_TIMEOUT_SECS, LEGACY_BASE_URL, MODERN_BASE_URL};
use crate::reactor::{ReactorConfig, DEFAULT_CACHE_DEBOUNCE_MS, DEFAULT_CONFIG_DEBOUNCE_MS};

/// Default location of the compiled challenge map.
pub const DEFAULT_CHALLENGES_PATH: &str = "./challs.json";

/// Default tile cache root.
pub const DEFAULT_CACHE_DIR: &str = "./public/img";

/// Largest accepted batch width.
pub const MAX_BATCH_WIDTH: usize = 256;

/// Default pause between the last batch and the metadata write.
pub const DEFAULT_WRITE_GRACE_MS: u64 = 0;

/// Default log directory (relative to the working directory).
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "panocache.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            paths: PathsSettings {
                challenges: PathBuf::from(DEFAULT_CHALLENGES_PATH),
                cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            },
            fetch: FetchSettings {
                batch_width: DEFAULT_BATCH_WIDTH,
                max_retries: DEFAULT_MAX_RETRIES,
                retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                write_grace_ms: DEFAULT_WRITE_GRACE_MS,
                refetch: RefetchScope::Full,
                legacy_base_url: LEGACY_BASE_URL.to_string(),
                modern_base_url: MODERN_BASE_URL.to_string(),
            },
            watch: WatchSettings {
                config_debounce_ms: DEFAULT_CONFIG_DEBOUNCE_MS,
                cache_debounce_ms: DEFAULT_CACHE_DEBOUNCE_MS,
            },
            logging: LoggingSettings {
                level: LogLevel::Summary,
                directory: PathBuf::from(DEFAULT_LOG_DIR),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Orchestrator settings from `[fetch]`.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default()
            .with_batch_width(self.fetch.batch_width)
            .with_write_grace(Duration::from_millis(self.fetch.write_grace_ms))
            .with_refetch(self.fetch.refetch)
    }

    /// Retry policy from `[fetch]`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::retries(
            self.fetch.max_retries,
            Duration::from_millis(self.fetch.retry_delay_ms),
        )
    }

    /// Tile URL builder from `[fetch]`.
    pub fn url_builder(&self) -> TileUrlBuilder {
        TileUrlBuilder::new(&self.fetch.legacy_base_url, &self.fetch.modern_base_url)
    }

    /// Reactor settings from `[paths]` and `[watch]`.
    pub fn reactor_config(&self) -> ReactorConfig {
        ReactorConfig::new(&self.paths.challenges, &self.paths.cache_dir).with_debounce(
            Duration::from_millis(self.watch.config_debounce_ms),
            Duration::from_millis(self.watch.cache_debounce_ms),
        )
    }
}
