//! Application bootstrap implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::AppError;
use crate::challenge::{ChallengeCatalog, ChallengeKey};
use crate::config::ConfigFile;
use crate::fetcher::TileFetcher;
use crate::orchestrator::{FetchOrchestrator, PassSummary, SyncContext};
use crate::provider::{AsyncHttpClient, AsyncReqwestClient};
use crate::pyramid;
use crate::reactor::{ChangeReactor, ReactorConfig};
use crate::staleness::Staleness;
use crate::store::TileStore;

/// Cache state of one challenge, as reported by [`PanoCacheApp::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeStatus {
    pub key: ChallengeKey,
    pub panorama_id: Option<String>,
    /// `None` for challenges without a panorama id
    pub staleness: Option<Staleness>,
    pub present: u64,
    pub expected: u64,
    /// When the metadata record was last written, if there is one
    pub cached_at: Option<DateTime<Utc>>,
}

/// Fully wired pipeline built from a configuration file.
pub struct PanoCacheApp<C = AsyncReqwestClient> {
    orchestrator: FetchOrchestrator<C>,
    challenges: PathBuf,
    reactor_config: ReactorConfig,
}

impl PanoCacheApp<AsyncReqwestClient> {
    /// Builds the pipeline with the real HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &ConfigFile) -> Result<Self, AppError> {
        let client = AsyncReqwestClient::with_timeout(config.fetch.timeout_secs)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }
}

impl<C: AsyncHttpClient + 'static> PanoCacheApp<C> {
    /// Builds the pipeline around an existing HTTP client.
    pub fn with_client(config: &ConfigFile, client: Arc<C>) -> Self {
        let fetcher = TileFetcher::new(client)
            .with_urls(config.url_builder())
            .with_retry(config.retry_policy());
        let store = Arc::new(TileStore::new(&config.paths.cache_dir));
        let orchestrator = FetchOrchestrator::new(fetcher, store, config.sync_config());

        info!(
            challenges = %config.paths.challenges.display(),
            cache_dir = %config.paths.cache_dir.display(),
            batch_width = config.fetch.batch_width,
            refetch = %config.fetch.refetch,
            "Pipeline ready"
        );

        Self {
            orchestrator,
            challenges: config.paths.challenges.clone(),
            reactor_config: config.reactor_config(),
        }
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator<C> {
        &self.orchestrator
    }

    pub fn challenges_path(&self) -> &Path {
        &self.challenges
    }

    /// Runs one sync pass over the challenge map.
    ///
    /// Returns `Ok(None)` when the challenge map does not exist.
    pub async fn sync_once(&self, ctx: &mut SyncContext) -> Result<Option<PassSummary>, AppError> {
        Ok(self
            .orchestrator
            .sync_catalog_file(&self.challenges, ctx)
            .await?)
    }

    /// Evaluates every challenge without fetching anything.
    ///
    /// Returns `Ok(None)` when the challenge map does not exist.
    pub async fn status(&self) -> Result<Option<Vec<ChallengeStatus>>, AppError> {
        let Some(catalog) = ChallengeCatalog::load(&self.challenges)? else {
            return Ok(None);
        };

        let store = self.orchestrator.store();
        let mut statuses = Vec::with_capacity(catalog.len());
        for challenge in &catalog {
            let staleness = match challenge.panorama_id {
                Some(_) => Some(self.orchestrator.staleness().evaluate(challenge).await),
                None => None,
            };
            statuses.push(ChallengeStatus {
                key: challenge.key(),
                panorama_id: challenge.panorama_id.clone(),
                staleness,
                present: store.count_existing_tiles(challenge).await,
                expected: pyramid::expected_tile_count(challenge.max_zoom),
                cached_at: store
                    .read_metadata(challenge)
                    .await
                    .and_then(|meta| meta.written_at()),
            });
        }
        Ok(Some(statuses))
    }

    /// Runs the change reactor until `cancel` is triggered.
    pub async fn run_continuous(self, cancel: CancellationToken) -> Result<SyncContext, AppError> {
        let reactor = ChangeReactor::new(self.orchestrator, self.reactor_config);
        Ok(reactor.run(cancel).await?)
    }
}
