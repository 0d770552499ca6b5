//! Cache freshness decisions.
//!
//! A cache entry is fresh when its metadata names the challenge's current
//! panorama id and the directory holds at least as many tile files as the
//! pyramid has coordinates. Tile contents are never inspected.

use std::fmt;
use std::sync::Arc;

use crate::challenge::Challenge;
use crate::pyramid;
use crate::store::TileStore;

/// Verdict for one challenge's cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Metadata matches and every tile is present
    Fresh,
    /// No metadata record yet
    ColdCache,
    /// Upstream panorama id differs from the one the tiles were fetched for
    PanoramaChanged { previous: String },
    /// Some tile files are missing
    Incomplete { present: u64, expected: u64 },
}

impl Staleness {
    /// Whether the challenge has to be fetched again.
    pub fn needs_refresh(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::Fresh => write!(f, "fresh"),
            Staleness::ColdCache => write!(f, "cold cache"),
            Staleness::PanoramaChanged { previous } => {
                write!(f, "panorama changed (was {})", previous)
            }
            Staleness::Incomplete { present, expected } => {
                write!(f, "incomplete ({}/{} tiles)", present, expected)
            }
        }
    }
}

/// Decides whether cache entries need refreshing.
#[derive(Debug, Clone)]
pub struct StalenessEvaluator {
    store: Arc<TileStore>,
}

impl StalenessEvaluator {
    pub fn new(store: Arc<TileStore>) -> Self {
        Self { store }
    }

    /// Evaluates a challenge's cache entry.
    ///
    /// Checks run in order: metadata present, panorama id unchanged, tile
    /// count complete. The first failing check names the verdict.
    pub async fn evaluate(&self, challenge: &Challenge) -> Staleness {
        let Some(meta) = self.store.read_metadata(challenge).await else {
            return Staleness::ColdCache;
        };

        if challenge.panorama_id.as_deref() != Some(meta.panorama_id.as_str()) {
            return Staleness::PanoramaChanged {
                previous: meta.panorama_id,
            };
        }

        let expected = pyramid::expected_tile_count(challenge.max_zoom);
        let present = self.store.count_existing_tiles(challenge).await;
        if present < expected {
            return Staleness::Incomplete { present, expected };
        }

        Staleness::Fresh
    }

    /// Shorthand for `evaluate(challenge).await.needs_refresh()`.
    pub async fn needs_refresh(&self, challenge: &Challenge) -> bool {
        self.evaluate(challenge).await.needs_refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::PanoType;
    use crate::pyramid::TileCoord;
    use crate::store::CacheMetadata;
    use tempfile::TempDir;

    async fn populated(temp: &TempDir, pano: &str) -> (StalenessEvaluator, Arc<TileStore>, Challenge) {
        let store = Arc::new(TileStore::new(temp.path()));
        let challenge = Challenge::new("eu", "Tower", PanoType::Modern, 2).with_panorama(pano);
        for tile in pyramid::coordinates(challenge.max_zoom) {
            store.write_tile(&challenge, &tile, b"x").await.unwrap();
        }
        store
            .write_metadata(&challenge, &CacheMetadata::for_challenge(&challenge).unwrap())
            .await
            .unwrap();
        (StalenessEvaluator::new(store.clone()), store, challenge)
    }

    #[tokio::test]
    async fn test_cold_cache() {
        let temp = TempDir::new().unwrap();
        let evaluator = StalenessEvaluator::new(Arc::new(TileStore::new(temp.path())));
        let challenge = Challenge::new("eu", "Tower", PanoType::Modern, 1).with_panorama("abc");

        assert_eq!(evaluator.evaluate(&challenge).await, Staleness::ColdCache);
        assert!(evaluator.needs_refresh(&challenge).await);
    }

    #[tokio::test]
    async fn test_complete_matching_cache_is_fresh() {
        let temp = TempDir::new().unwrap();
        let (evaluator, _, challenge) = populated(&temp, "abc").await;

        assert_eq!(evaluator.evaluate(&challenge).await, Staleness::Fresh);
        assert!(!evaluator.needs_refresh(&challenge).await);
    }

    #[tokio::test]
    async fn test_only_panorama_changed() {
        let temp = TempDir::new().unwrap();
        let (evaluator, _, challenge) = populated(&temp, "abc").await;
        let changed = challenge.with_panorama("xyz");

        assert_eq!(
            evaluator.evaluate(&changed).await,
            Staleness::PanoramaChanged {
                previous: "abc".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_one_tile_deleted() {
        let temp = TempDir::new().unwrap();
        let (evaluator, store, challenge) = populated(&temp, "abc").await;
        std::fs::remove_file(store.tile_path(&challenge, &TileCoord::new(3, 1, 2))).unwrap();

        assert_eq!(
            evaluator.evaluate(&challenge).await,
            Staleness::Incomplete {
                present: 9,
                expected: 10
            }
        );
        assert!(evaluator.needs_refresh(&challenge).await);
    }

    #[test]
    fn test_display() {
        assert_eq!(Staleness::Fresh.to_string(), "fresh");
        assert_eq!(
            Staleness::Incomplete {
                present: 1,
                expected: 2
            }
            .to_string(),
            "incomplete (1/2 tiles)"
        );
    }
}
