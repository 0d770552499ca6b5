//! Per-challenge tile synchronization.
//!
//! For each challenge, [`FetchOrchestrator`] evaluates the cache entry,
//! downloads the pyramid in fixed-width batches and records the metadata:
//!
//! 1. no panorama id: skipped with a warning
//! 2. cache directory created if missing
//! 3. fresh cache: nothing fetched
//! 4. coordinates fetched in batches of `batch_width`; each batch is joined
//!    before the next one starts, and single-tile failures are only counted
//! 5. metadata written once every batch has been flushed
//!
//! Challenges of a catalog are synced strictly one after another.

mod context;
mod types;

pub use context::SyncContext;
pub use types::{
    FetchStats, PassSummary, RefetchScope, SyncConfig, SyncReport, SyncStatus,
    DEFAULT_BATCH_WIDTH,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::challenge::{Challenge, ChallengeCatalog, ChallengeError};
use crate::fetcher::{FetchError, TileFetcher};
use crate::provider::AsyncHttpClient;
use crate::pyramid::{self, TileCoord};
use crate::staleness::{Staleness, StalenessEvaluator};
use crate::store::{CacheMetadata, TileStore};

/// Result of fetching and storing one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileOutcome {
    Stored,
    Unavailable,
    Failed,
}

/// Drives staleness evaluation, batched fetching and persistence.
pub struct FetchOrchestrator<C> {
    fetcher: TileFetcher<C>,
    store: Arc<TileStore>,
    staleness: StalenessEvaluator,
    config: SyncConfig,
}

impl<C: AsyncHttpClient> FetchOrchestrator<C> {
    /// Creates a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Downloads single tiles
    /// * `store` - Cache the tiles are written to
    /// * `config` - Batch width, grace delay and re-fetch scope
    pub fn new(fetcher: TileFetcher<C>, store: Arc<TileStore>, config: SyncConfig) -> Self {
        Self {
            fetcher,
            staleness: StalenessEvaluator::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<TileStore> {
        &self.store
    }

    pub fn staleness(&self) -> &StalenessEvaluator {
        &self.staleness
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Brings one challenge's cache entry up to date.
    ///
    /// Never fails: problems are logged and reflected in the report.
    pub async fn sync_challenge(&self, challenge: &Challenge) -> SyncReport {
        let start = Instant::now();
        let key = challenge.key();

        let report = |status, staleness, stats| SyncReport {
            key: key.clone(),
            status,
            staleness,
            stats,
            elapsed: start.elapsed(),
        };

        let Some(metadata) = CacheMetadata::for_challenge(challenge) else {
            warn!(challenge = %key, "No panorama id, skipping");
            return report(SyncStatus::Skipped, None, FetchStats::default());
        };

        if let Err(e) = self.store.ensure_challenge_dir(challenge).await {
            error!(challenge = %key, error = %e, "Failed to create cache directory");
            return report(SyncStatus::Failed(e.to_string()), None, FetchStats::default());
        }

        let verdict = self.staleness.evaluate(challenge).await;
        if !verdict.needs_refresh() {
            debug!(challenge = %key, "Cache up to date");
            return report(SyncStatus::UpToDate, Some(verdict), FetchStats::default());
        }

        info!(
            challenge = %key,
            reason = %verdict,
            scope = %self.config.refetch,
            "Fetching tiles"
        );

        let stats = match (self.config.refetch, &verdict) {
            (RefetchScope::Missing, Staleness::Incomplete { .. }) => {
                let missing = self.store.missing_tiles(challenge).await;
                self.fetch_batches(challenge, missing).await
            }
            _ => {
                self.fetch_batches(challenge, pyramid::coordinates(challenge.max_zoom))
                    .await
            }
        };

        if !self.config.write_grace.is_zero() {
            tokio::time::sleep(self.config.write_grace).await;
        }

        if let Err(e) = self.store.write_metadata(challenge, &metadata).await {
            error!(challenge = %key, error = %e, "Failed to write cache metadata");
            return report(SyncStatus::Failed(e.to_string()), Some(verdict), stats);
        }

        let elapsed = start.elapsed().as_secs_f64();
        if stats.is_complete() {
            info!(
                challenge = %key,
                tiles = stats.succeeded,
                "Fetched {} tiles in {:.2}s",
                stats.succeeded,
                elapsed
            );
        } else {
            warn!(
                challenge = %key,
                succeeded = stats.succeeded,
                unavailable = stats.unavailable,
                failed = stats.failed,
                "Fetched {}/{} tiles in {:.2}s",
                stats.succeeded,
                stats.total,
                elapsed
            );
        }

        report(SyncStatus::Fetched, Some(verdict), stats)
    }

    /// Fetches and stores tiles in batches of the configured width.
    ///
    /// All tiles of a batch run concurrently; the next batch starts only
    /// once every tile of the current one has been written or has failed.
    /// Coordinates are pulled from `tiles` one batch at a time.
    pub async fn fetch_batches<I>(&self, challenge: &Challenge, tiles: I) -> FetchStats
    where
        I: IntoIterator<Item = TileCoord>,
    {
        let width = self.config.batch_width.max(1);
        let mut tiles = tiles.into_iter();
        let mut stats = FetchStats::default();

        loop {
            let batch: Vec<TileCoord> = tiles.by_ref().take(width).collect();
            if batch.is_empty() {
                break;
            }
            stats.total += batch.len() as u64;

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|tile| self.fetch_and_store(challenge, tile)),
            )
            .await;

            for outcome in outcomes {
                match outcome {
                    TileOutcome::Stored => stats.succeeded += 1,
                    TileOutcome::Unavailable => stats.unavailable += 1,
                    TileOutcome::Failed => stats.failed += 1,
                }
            }
            stats.batches += 1;

            debug!(
                challenge = %challenge.key(),
                batch = stats.batches,
                size = batch.len(),
                succeeded = stats.succeeded,
                "Batch complete"
            );
        }

        stats
    }

    async fn fetch_and_store(&self, challenge: &Challenge, tile: &TileCoord) -> TileOutcome {
        let data = match self.fetcher.fetch(tile, challenge).await {
            Ok(data) => data,
            Err(FetchError::NotAvailable) => return TileOutcome::Unavailable,
            Err(_) => return TileOutcome::Failed,
        };

        match self.store.write_tile(challenge, tile, &data).await {
            Ok(()) => TileOutcome::Stored,
            Err(e) => {
                error!(challenge = %challenge.key(), tile = %tile, error = %e, "Failed to save tile");
                TileOutcome::Failed
            }
        }
    }

    /// Syncs every challenge of a catalog, one after another.
    pub async fn sync_all(&self, catalog: &ChallengeCatalog, ctx: &mut SyncContext) -> PassSummary {
        let start = Instant::now();
        let mut summary = PassSummary::new(ctx.begin_pass());

        for challenge in catalog {
            let report = self.sync_challenge(challenge).await;
            summary.record(&report);
            ctx.record(report);
        }

        summary.elapsed = start.elapsed();
        info!(
            pass = summary.pass,
            challenges = summary.challenges,
            fetched = summary.fetched,
            up_to_date = summary.up_to_date,
            skipped = summary.skipped,
            "All challenges processed in {:.2}s",
            summary.elapsed.as_secs_f64()
        );
        summary
    }

    /// Loads the challenge map at `path` and syncs it.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub async fn sync_catalog_file(
        &self,
        path: &Path,
        ctx: &mut SyncContext,
    ) -> Result<Option<PassSummary>, ChallengeError> {
        match ChallengeCatalog::load(path)? {
            Some(catalog) => Ok(Some(self.sync_all(&catalog, ctx).await)),
            None => {
                warn!(path = %path.display(), "Challenge map not found, skipping");
                Ok(None)
            }
        }
    }
}
