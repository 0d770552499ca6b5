//! Per-challenge metadata record (`.meta`).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;

/// What was fetched into a cache entry, and when.
///
/// Serialized as JSON `{"panoramaId", "lat", "lng", "timestamp"}` with the
/// timestamp in epoch milliseconds. Records written by older tooling used the
/// field name `pano`, which is still accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// Panorama id the tiles were downloaded for
    #[serde(alias = "pano")]
    pub panorama_id: String,
    /// Latitude at the time of the fetch
    #[serde(default)]
    pub lat: f64,
    /// Longitude at the time of the fetch
    #[serde(default)]
    pub lng: f64,
    /// Write time in milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl CacheMetadata {
    /// Creates a record stamped with the current time.
    pub fn new(panorama_id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            panorama_id: panorama_id.into(),
            lat,
            lng,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Creates the record describing a challenge as it is now.
    ///
    /// Returns `None` when the challenge has no panorama id.
    pub fn for_challenge(challenge: &Challenge) -> Option<Self> {
        challenge
            .panorama_id
            .as_deref()
            .map(|id| Self::new(id, challenge.lat, challenge.lng))
    }

    /// Write time as a UTC date, if the timestamp is representable.
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
