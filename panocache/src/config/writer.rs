//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[paths]
; Compiled challenge map (JSON), re-read on every sync pass
challenges = {}
; Root of the tile cache; tiles land in <cache_dir>/<compartment>/<name>/
cache_dir = {}

[fetch]
; Tiles downloaded concurrently per batch (1-256)
batch_width = {}
; Retries after the first attempt for transport errors, HTTP 429 and 5xx
max_retries = {}
; Delay between attempts in milliseconds
retry_delay_ms = {}
; HTTP request timeout in seconds
timeout_secs = {}
; Extra pause before the metadata record is written (milliseconds)
write_grace_ms = {}
; Tiles fetched when some are missing and the panorama is unchanged:
;   full    - the whole pyramid again
;   missing - only tiles without a file
refetch = {}
; Tile server base URLs (override for mirrors or testing)
legacy_base_url = {}
modern_base_url = {}

[watch]
; Quiet period after the challenge map changes (milliseconds)
config_debounce_ms = {}
; Quiet period after cached tiles are removed (milliseconds)
cache_debounce_ms = {}

[logging]
; summary - per-challenge progress; verbose - per-tile detail
; RUST_LOG overrides this when set
level = {}
directory = {}
file = {}
"#,
        path_to_string(&config.paths.challenges),
        path_to_string(&config.paths.cache_dir),
        config.fetch.batch_width,
        config.fetch.max_retries,
        config.fetch.retry_delay_ms,
        config.fetch.timeout_secs,
        config.fetch.write_grace_ms,
        config.fetch.refetch,
        config.fetch.legacy_base_url,
        config.fetch.modern_base_url,
        config.watch.config_debounce_ms,
        config.watch.cache_debounce_ms,
        config.logging.level,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use crate::logging::LogLevel;
    use crate::orchestrator::RefetchScope;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_modified_config_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested/config.ini");

        let mut config = ConfigFile::default();
        config.paths.cache_dir = PathBuf::from("/var/cache/panocache");
        config.fetch.batch_width = 4;
        config.fetch.refetch = RefetchScope::Missing;
        config.logging.level = LogLevel::Verbose;
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }
}
