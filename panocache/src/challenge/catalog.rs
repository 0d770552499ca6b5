//! Loading the compiled challenge map.
//!
//! The map is produced by an external compiler (YAML → JSON) and looks like:
//!
//! ```text
//! {
//!   "<compartment>": {
//!     "<name>": { "panoType": 1, "pano": "abc", "lat": 48.85, "lng": 2.29, "maxZ": 3, ... }
//!   }
//! }
//! ```
//!
//! The modern key names `panoramaId` and `maxZoom` are accepted as well.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::{is_path_segment, sanitize_name, Challenge, ChallengeKey, PanoType};
use crate::pyramid::MAX_ZOOM;

/// Errors raised while loading the challenge map.
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// The file exists but could not be read.
    #[error("Failed to read challenge map {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// The file is not a valid challenge map.
    #[error("Failed to parse challenge map {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A compartment or name would not map to a single cache directory.
    #[error("Challenge {key} does not map to a directory under the cache root")]
    InvalidPath { key: ChallengeKey },

    /// A challenge asks for a deeper pyramid than supported.
    #[error("Challenge {key} has maxZoom {zoom} (max: {max})")]
    InvalidZoom {
        key: ChallengeKey,
        zoom: u8,
        max: u8,
    },
}

#[derive(Debug, Deserialize)]
struct ChallengeEntry {
    #[serde(rename = "panoType")]
    pano_type: PanoType,
    #[serde(rename = "panoramaId", alias = "pano", default)]
    panorama_id: Option<String>,
    lat: f64,
    lng: f64,
    #[serde(rename = "maxZoom", alias = "maxZ")]
    max_zoom: u8,
}

type RawCatalog = BTreeMap<String, BTreeMap<String, ChallengeEntry>>;

/// All challenges of one compiled challenge map, in compartment then name order.
#[derive(Debug, Clone, Default)]
pub struct ChallengeCatalog {
    challenges: Vec<Challenge>,
}

impl ChallengeCatalog {
    /// Loads the challenge map at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist yet, which is the normal
    /// state before the config compiler has run for the first time.
    pub fn load(path: &Path) -> Result<Option<Self>, ChallengeError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ChallengeError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let raw: RawCatalog =
            serde_json::from_str(&content).map_err(|source| ChallengeError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_raw(raw).map(Some)
    }

    /// Parses a challenge map from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ChallengeError> {
        let raw: RawCatalog =
            serde_json::from_str(json).map_err(|source| ChallengeError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        Self::from_raw(raw)
    }

    /// Builds a catalog from already constructed challenges.
    ///
    /// Challenges are reordered by compartment then name.
    pub fn from_challenges(mut challenges: Vec<Challenge>) -> Self {
        challenges.sort_by(|a, b| {
            (&a.compartment, &a.name).cmp(&(&b.compartment, &b.name))
        });
        Self { challenges }
    }

    fn from_raw(raw: RawCatalog) -> Result<Self, ChallengeError> {
        let mut challenges = Vec::new();

        for (compartment, entries) in raw {
            for (name, entry) in entries {
                if !is_path_segment(&compartment) || !is_path_segment(&sanitize_name(&name)) {
                    return Err(ChallengeError::InvalidPath {
                        key: ChallengeKey::new(compartment, name),
                    });
                }
                if entry.max_zoom > MAX_ZOOM {
                    return Err(ChallengeError::InvalidZoom {
                        key: ChallengeKey::new(compartment, name),
                        zoom: entry.max_zoom,
                        max: MAX_ZOOM,
                    });
                }

                challenges.push(Challenge {
                    compartment: compartment.clone(),
                    name,
                    pano_type: entry.pano_type,
                    panorama_id: entry.panorama_id.filter(|id| !id.trim().is_empty()),
                    lat: entry.lat,
                    lng: entry.lng,
                    max_zoom: entry.max_zoom,
                });
            }
        }

        Ok(Self { challenges })
    }

    /// Iterates challenges in sync order.
    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.iter()
    }

    /// Looks up a challenge by key.
    pub fn get(&self, key: &ChallengeKey) -> Option<&Challenge> {
        self.challenges
            .iter()
            .find(|c| c.compartment == key.compartment && c.name == key.name)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChallengeCatalog {
    type Item = &'a Challenge;
    type IntoIter = std::slice::Iter<'a, Challenge>;

    fn into_iter(self) -> Self::IntoIter {
        self.challenges.iter()
    }
}
