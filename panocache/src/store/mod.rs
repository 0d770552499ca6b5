//! On-disk tile cache.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/<compartment>/<sanitized name>/
//!     tile_{x}_{y}_{zoom}.jpeg
//!     .meta
//! ```
//!
//! The store performs no locking: one writer per cache entry is assumed.

mod filename;
mod metadata;

pub use filename::{is_tile_filename, parse_tile_filename, tile_filename, ParseError};
pub use metadata::CacheMetadata;

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{trace, warn};

use crate::challenge::Challenge;
use crate::pyramid::{self, TileCoord};

/// Name of the per-challenge metadata file.
pub const METADATA_FILENAME: &str = ".meta";

const METADATA_TMP_FILENAME: &str = ".meta.tmp";

/// Errors from cache writes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Tile and metadata persistence rooted at the cache directory.
#[derive(Debug, Clone)]
pub struct TileStore {
    root: PathBuf,
}

impl TileStore {
    /// Creates a store rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a challenge's cache entry.
    pub fn challenge_dir(&self, challenge: &Challenge) -> PathBuf {
        self.root
            .join(&challenge.compartment)
            .join(challenge.dir_name())
    }

    /// Path of one tile of a challenge.
    pub fn tile_path(&self, challenge: &Challenge, tile: &TileCoord) -> PathBuf {
        self.challenge_dir(challenge).join(tile_filename(tile))
    }

    /// Path of a challenge's metadata record.
    pub fn metadata_path(&self, challenge: &Challenge) -> PathBuf {
        self.challenge_dir(challenge).join(METADATA_FILENAME)
    }

    /// Creates the challenge directory (and parents) if missing.
    pub async fn ensure_challenge_dir(&self, challenge: &Challenge) -> Result<PathBuf, StoreError> {
        let dir = self.challenge_dir(challenge);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;
        Ok(dir)
    }

    /// Writes one tile, replacing any existing file.
    ///
    /// The data is synced to disk before this returns.
    pub async fn write_tile(
        &self,
        challenge: &Challenge,
        tile: &TileCoord,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let path = self.tile_path(challenge, tile);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        write_synced(&path, data).await?;
        trace!(path = %path.display(), bytes = data.len(), "Tile written");
        Ok(())
    }

    /// Reads a challenge's metadata record.
    ///
    /// A missing record yields `None`. An unreadable or unparsable record is
    /// logged and also treated as missing.
    pub async fn read_metadata(&self, challenge: &Challenge) -> Option<CacheMetadata> {
        let path = self.metadata_path(challenge);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cache metadata");
                return None;
            }
        };

        match serde_json::from_slice(&contents) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed cache metadata");
                None
            }
        }
    }

    /// Writes a challenge's metadata record.
    ///
    /// The record is written to a temporary sibling and renamed into place.
    pub async fn write_metadata(
        &self,
        challenge: &Challenge,
        metadata: &CacheMetadata,
    ) -> Result<(), StoreError> {
        let dir = self.ensure_challenge_dir(challenge).await?;
        let json = serde_json::to_vec(metadata)?;

        let tmp = dir.join(METADATA_TMP_FILENAME);
        write_synced(&tmp, &json).await?;

        let path = dir.join(METADATA_FILENAME);
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    /// Counts the tile files of a challenge.
    ///
    /// Only names following the tile convention are counted. A missing
    /// directory counts as zero.
    pub async fn count_existing_tiles(&self, challenge: &Challenge) -> u64 {
        self.existing_tiles(challenge).await.len() as u64
    }

    /// Coordinates of every tile file present for a challenge.
    ///
    /// Files for coordinates outside the challenge's pyramid are left out.
    pub async fn existing_tiles(&self, challenge: &Challenge) -> HashSet<TileCoord> {
        let dir = self.challenge_dir(challenge);
        let mut tiles = HashSet::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(dir = %dir.display(), error = %e, "Failed to list cache directory");
                }
                return tiles;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Some(name) = entry.file_name().to_str() {
                        match parse_tile_filename(name) {
                            Ok(tile) if tile.is_within(challenge.max_zoom) => {
                                tiles.insert(tile);
                            }
                            _ => {}
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Failed to list cache directory");
                    break;
                }
            }
        }

        tiles
    }

    /// Pyramid coordinates of a challenge that have no tile file.
    ///
    /// The directory is listed once; the pyramid itself is walked lazily.
    pub async fn missing_tiles(
        &self,
        challenge: &Challenge,
    ) -> impl Iterator<Item = TileCoord> + Send {
        let present = self.existing_tiles(challenge).await;
        pyramid::coordinates(challenge.max_zoom).filter(move |tile| !present.contains(tile))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(data)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.sync_all().await.map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
