//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::MAX_BATCH_WIDTH;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [paths] section
    if let Some(section) = ini.section(Some("paths")) {
        if let Some(v) = non_empty(section.get("challenges")) {
            config.paths.challenges = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("cache_dir")) {
            config.paths.cache_dir = expand_tilde(v);
        }
    }

    // [fetch] section
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = section.get("batch_width") {
            let width: usize = parse_number("fetch", "batch_width", v, "must be a positive integer")?;
            if !(1..=MAX_BATCH_WIDTH).contains(&width) {
                return Err(invalid(
                    "fetch",
                    "batch_width",
                    v,
                    &format!("must be between 1 and {}", MAX_BATCH_WIDTH),
                ));
            }
            config.fetch.batch_width = width;
        }
        if let Some(v) = section.get("max_retries") {
            config.fetch.max_retries =
                parse_number("fetch", "max_retries", v, "must be a non-negative integer")?;
        }
        if let Some(v) = section.get("retry_delay_ms") {
            config.fetch.retry_delay_ms =
                parse_number("fetch", "retry_delay_ms", v, "must be a non-negative integer (ms)")?;
        }
        if let Some(v) = section.get("timeout_secs") {
            let timeout: u64 =
                parse_number("fetch", "timeout_secs", v, "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(invalid("fetch", "timeout_secs", v, "must be a positive integer (seconds)"));
            }
            config.fetch.timeout_secs = timeout;
        }
        if let Some(v) = section.get("write_grace_ms") {
            config.fetch.write_grace_ms =
                parse_number("fetch", "write_grace_ms", v, "must be a non-negative integer (ms)")?;
        }
        if let Some(v) = section.get("refetch") {
            config.fetch.refetch = v
                .parse()
                .map_err(|_| invalid("fetch", "refetch", v, "must be 'full' or 'missing'"))?;
        }
        if let Some(v) = non_empty(section.get("legacy_base_url")) {
            config.fetch.legacy_base_url = v.to_string();
        }
        if let Some(v) = non_empty(section.get("modern_base_url")) {
            config.fetch.modern_base_url = v.to_string();
        }
    }

    // [watch] section
    if let Some(section) = ini.section(Some("watch")) {
        if let Some(v) = section.get("config_debounce_ms") {
            config.watch.config_debounce_ms =
                parse_number("watch", "config_debounce_ms", v, "must be a non-negative integer (ms)")?;
        }
        if let Some(v) = section.get("cache_debounce_ms") {
            config.watch.cache_debounce_ms =
                parse_number("watch", "cache_debounce_ms", v, "must be a non-negative integer (ms)")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("level") {
            config.logging.level = v
                .parse()
                .map_err(|_| invalid("logging", "level", v, "must be 'summary' or 'verbose'"))?;
        }
        if let Some(v) = non_empty(section.get("directory")) {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
