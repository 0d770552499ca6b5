//! Continuous mode: watch the challenge map and the cache, re-sync on change.
//!
//! Two sources are watched with a single `notify` watcher:
//!
//! - the directory holding the challenge map (non-recursive); creating or
//!   modifying the map arms the config timer
//! - the cache root (recursive); removing a tile file or any directory arms
//!   the cache timer
//!
//! Deleting the cache root drops its watch, so the root is re-created and
//! watched again as soon as that is seen, and once more after every pass.
//!
//! Each timer fires once per quiet period and requests a sync pass. Passes
//! run on a single worker task, so they never overlap; requests arriving
//! during a pass collapse into one follow-up pass.

mod debounce;
mod events;

pub use debounce::Debouncer;
pub use events::{EventClassifier, Trigger};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::orchestrator::{FetchOrchestrator, SyncContext};
use crate::provider::AsyncHttpClient;

/// Default quiet period for challenge map changes.
pub const DEFAULT_CONFIG_DEBOUNCE_MS: u64 = 500;

/// Default quiet period for cache removals.
pub const DEFAULT_CACHE_DEBOUNCE_MS: u64 = 1000;

/// Errors that stop the reactor.
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Sync worker stopped unexpectedly: {0}")]
    Worker(String),
}

/// Paths and timings of the reactor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactorConfig {
    pub challenges: PathBuf,
    pub cache_root: PathBuf,
    pub config_debounce: Duration,
    pub cache_debounce: Duration,
}

impl ReactorConfig {
    pub fn new(challenges: impl Into<PathBuf>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            challenges: challenges.into(),
            cache_root: cache_root.into(),
            config_debounce: Duration::from_millis(DEFAULT_CONFIG_DEBOUNCE_MS),
            cache_debounce: Duration::from_millis(DEFAULT_CACHE_DEBOUNCE_MS),
        }
    }

    pub fn with_debounce(mut self, config: Duration, cache: Duration) -> Self {
        self.config_debounce = config;
        self.cache_debounce = cache;
        self
    }
}

/// Re-runs the orchestrator whenever watched files change.
pub struct ChangeReactor<C> {
    orchestrator: Arc<FetchOrchestrator<C>>,
    config: ReactorConfig,
}

impl<C: AsyncHttpClient + 'static> ChangeReactor<C> {
    pub fn new(orchestrator: FetchOrchestrator<C>, config: ReactorConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config,
        }
    }

    /// Runs until `cancel` is triggered.
    ///
    /// An initial pass is requested when the challenge map already exists.
    /// A pass in progress at cancellation is allowed to finish. Returns the
    /// sync context accumulated over all passes.
    pub async fn run(self, cancel: CancellationToken) -> Result<SyncContext, ReactorError> {
        let (challenges_dir, challenges) = resolve_challenges_path(&self.config.challenges)?;
        let cache_root = prepare_dir(&self.config.cache_root)?;
        let classifier = EventClassifier::new(challenges.clone(), cache_root.clone());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                let _ = tx.send(res);
            },
            NotifyConfig::default(),
        )?;
        watcher.watch(&challenges_dir, RecursiveMode::NonRecursive)?;
        watcher.watch(&cache_root, RecursiveMode::Recursive)?;
        info!(
            challenges = %challenges.display(),
            cache_root = %cache_root.display(),
            "Watching for changes"
        );

        let pending = Arc::new(Notify::new());
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let worker_cancel = cancel.child_token();
        let worker = tokio::spawn(sync_worker(
            Arc::clone(&self.orchestrator),
            challenges.clone(),
            Arc::clone(&pending),
            done_tx,
            worker_cancel.clone(),
        ));

        if challenges.exists() {
            pending.notify_one();
        } else {
            info!(path = %challenges.display(), "Waiting for challenge map to be created");
        }

        let mut config_timer = Debouncer::new(self.config.config_debounce);
        let mut cache_timer = Debouncer::new(self.config.cache_debounce);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(Ok(event)) => match classifier.classify(&event) {
                        Some(Trigger::Config) => {
                            debug!(paths = ?event.paths, "Challenge map event");
                            config_timer.arm();
                        }
                        Some(Trigger::CacheRemoval) => {
                            debug!(paths = ?event.paths, "Cache removal event");
                            cache_timer.arm();
                        }
                        Some(Trigger::CacheRootRemoved) => {
                            warn!(cache_root = %cache_root.display(), "Cache root removed, re-creating");
                            watch_cache_root(&mut watcher, &cache_root);
                            cache_timer.arm();
                        }
                        None => {}
                    },
                    Some(Err(e)) => warn!(error = %e, "File watcher error"),
                    None => break,
                },
                Some(()) = done_rx.recv() => watch_cache_root(&mut watcher, &cache_root),
                _ = config_timer.fired() => {
                    info!("Challenge map changed, syncing");
                    pending.notify_one();
                }
                _ = cache_timer.fired() => {
                    info!("Cached files removed, syncing");
                    pending.notify_one();
                }
            }
        }

        drop(watcher);
        worker_cancel.cancel();
        worker
            .await
            .map_err(|e| ReactorError::Worker(e.to_string()))
    }
}

/// Runs one pass per wake-up until cancelled, reporting each finished pass
/// on `done`.
async fn sync_worker<C: AsyncHttpClient + 'static>(
    orchestrator: Arc<FetchOrchestrator<C>>,
    challenges: PathBuf,
    pending: Arc<Notify>,
    done: mpsc::UnboundedSender<()>,
    cancel: CancellationToken,
) -> SyncContext {
    let mut ctx = SyncContext::new();
    loop {
        // Cancellation wins over a stored wake-up permit
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = pending.notified() => {}
        }
        if let Err(e) = orchestrator.sync_catalog_file(&challenges, &mut ctx).await {
            error!(error = %e, "Sync pass failed");
        }
        let _ = done.send(());
    }
    ctx
}

/// Re-creates the cache root if needed and (re)installs its recursive watch.
///
/// Watching an already watched path only refreshes the existing watch.
fn watch_cache_root(watcher: &mut RecommendedWatcher, cache_root: &Path) {
    if let Err(e) = std::fs::create_dir_all(cache_root) {
        warn!(cache_root = %cache_root.display(), error = %e, "Failed to re-create cache root");
        return;
    }
    if let Err(e) = watcher.watch(cache_root, RecursiveMode::Recursive) {
        warn!(cache_root = %cache_root.display(), error = %e, "Failed to watch cache root");
    }
}

/// Creates a directory if missing and returns its canonical path.
fn prepare_dir(dir: &Path) -> Result<PathBuf, ReactorError> {
    let io_err = |source| ReactorError::Io {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    dir.canonicalize().map_err(io_err)
}

/// Canonical (directory, file) pair for the challenge map, which may not
/// exist yet.
fn resolve_challenges_path(path: &Path) -> Result<(PathBuf, PathBuf), ReactorError> {
    let file_name = path.file_name().ok_or_else(|| ReactorError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "not a file path"),
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = prepare_dir(parent)?;
    let file = dir.join(file_name);
    Ok((dir, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::TileFetcher;
    use crate::orchestrator::SyncConfig;
    use crate::provider::{HttpResponse, MockAsyncHttpClient, ProviderError};
    use crate::store::TileStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn challenges_json(pano: &str) -> String {
        format!(
            r#"{{"europe": {{"Tower": {{"panoType": 1, "pano": "{}", "lat": 1.0, "lng": 2.0, "maxZ": 1}}}}}}"#,
            pano
        )
    }

    fn orchestrator<C: AsyncHttpClient>(temp: &TempDir, client: C) -> FetchOrchestrator<C> {
        FetchOrchestrator::new(
            TileFetcher::new(Arc::new(client)),
            Arc::new(TileStore::new(temp.path().join("img"))),
            SyncConfig::default(),
        )
    }

    fn reactor<C: AsyncHttpClient + 'static>(temp: &TempDir, client: C) -> ChangeReactor<C> {
        let config = ReactorConfig::new(temp.path().join("challs.json"), temp.path().join("img"))
            .with_debounce(Duration::from_millis(50), Duration::from_millis(50));
        ChangeReactor::new(orchestrator(temp, client), config)
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while !condition() {
            assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Image client that holds every request for `delay` and tracks how many
    /// requests overlap.
    #[derive(Clone)]
    struct SlowClient {
        delay: Duration,
        calls: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl SlowClient {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl AsyncHttpClient for SlowClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(MockAsyncHttpClient::image_response(b"jpeg"))
        }
    }

    #[tokio::test]
    async fn test_initial_pass_when_map_exists() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("challs.json"), challenges_json("abc")).unwrap();
        let mock = MockAsyncHttpClient::images();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(reactor(&temp, mock.clone()).run(cancel.clone()));
        let tile = temp.path().join("img/europe/Tower/tile_1_0_1.jpeg");
        let meta = temp.path().join("img/europe/Tower/.meta");
        wait_for(|| tile.exists() && meta.exists()).await;

        cancel.cancel();
        let ctx = handle.await.unwrap().unwrap();

        assert!(ctx.passes() >= 1);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_waits_without_map_and_stops_on_cancel() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::images();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(reactor(&temp, mock.clone()).run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        let ctx = handle.await.unwrap().unwrap();

        assert_eq!(ctx.passes(), 0);
        assert_eq!(mock.call_count(), 0);
        assert!(temp.path().join("img").is_dir());
    }

    #[tokio::test]
    async fn test_challenge_map_change_resyncs() {
        let temp = TempDir::new().unwrap();
        let map = temp.path().join("challs.json");
        std::fs::write(&map, challenges_json("abc")).unwrap();
        let mock = MockAsyncHttpClient::images();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(reactor(&temp, mock.clone()).run(cancel.clone()));
        let meta = temp.path().join("img/europe/Tower/.meta");
        wait_for(|| meta.exists() && mock.call_count() == 2).await;

        std::fs::write(&map, challenges_json("def")).unwrap();
        wait_for(|| {
            std::fs::read_to_string(&meta).is_ok_and(|content| content.contains("\"def\""))
        })
        .await;

        cancel.cancel();
        handle.await.unwrap().unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[2..].iter().all(|url| url.contains("panoid=def")));
    }

    #[tokio::test]
    async fn test_tile_and_directory_removal_resyncs() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("challs.json"), challenges_json("abc")).unwrap();
        let mock = MockAsyncHttpClient::images();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(reactor(&temp, mock.clone()).run(cancel.clone()));
        let tile = temp.path().join("img/europe/Tower/tile_0_0_1.jpeg");
        let meta = temp.path().join("img/europe/Tower/.meta");
        wait_for(|| meta.exists() && mock.call_count() == 2).await;

        std::fs::remove_file(&tile).unwrap();
        wait_for(|| tile.exists() && mock.call_count() >= 4).await;
        wait_for(|| meta.exists()).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let fetched = mock.call_count();
        std::fs::remove_dir_all(temp.path().join("img/europe")).unwrap();
        wait_for(|| meta.exists() && mock.call_count() >= fetched + 2).await;

        cancel.cancel();
        handle.await.unwrap().unwrap();
        assert!(tile.exists());
    }

    #[tokio::test]
    async fn test_keeps_watching_after_cache_root_removal() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("challs.json"), challenges_json("abc")).unwrap();
        let mock = MockAsyncHttpClient::images();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(reactor(&temp, mock.clone()).run(cancel.clone()));
        let tile = temp.path().join("img/europe/Tower/tile_0_0_1.jpeg");
        let meta = temp.path().join("img/europe/Tower/.meta");
        wait_for(|| meta.exists() && mock.call_count() == 2).await;

        std::fs::remove_dir_all(temp.path().join("img")).unwrap();
        wait_for(|| meta.exists() && tile.exists() && mock.call_count() >= 4).await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The rebuilt tree must still be watched
        let fetched = mock.call_count();
        std::fs::remove_file(&tile).unwrap();
        wait_for(|| tile.exists() && mock.call_count() >= fetched + 2).await;

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_triggers_during_pass_collapse_into_one_follow_up() {
        let temp = TempDir::new().unwrap();
        let map = temp.path().join("challs.json");
        std::fs::write(&map, challenges_json("abc")).unwrap();
        let client = SlowClient::new(Duration::from_millis(500));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(reactor(&temp, client.clone()).run(cancel.clone()));
        wait_for(|| client.calls.load(Ordering::SeqCst) > 0).await;

        // Several map writes while the first pass is still downloading
        for _ in 0..3 {
            std::fs::write(&map, challenges_json("abc")).unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let meta = temp.path().join("img/europe/Tower/.meta");
        wait_for(|| meta.exists()).await;
        tokio::time::sleep(Duration::from_millis(800)).await;

        cancel.cancel();
        let ctx = handle.await.unwrap().unwrap();

        assert_eq!(ctx.passes(), 2);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert!(client.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_worker_prefers_cancellation_over_pending_wakeup() {
        let temp = TempDir::new().unwrap();
        let map = temp.path().join("challs.json");
        std::fs::write(&map, challenges_json("abc")).unwrap();
        let mock = MockAsyncHttpClient::images();

        let pending = Arc::new(Notify::new());
        pending.notify_one();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let ctx = sync_worker(
            Arc::new(orchestrator(&temp, mock.clone())),
            map,
            pending,
            done_tx,
            cancel,
        )
        .await;

        assert_eq!(ctx.passes(), 0);
        assert_eq!(mock.call_count(), 0);
        assert!(done_rx.try_recv().is_err());
    }

    #[test]
    fn test_resolve_relative_challenges_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/challs.json");

        let (dir, file) = resolve_challenges_path(&path).unwrap();

        assert!(dir.is_dir());
        assert_eq!(file.file_name().unwrap(), "challs.json");
        assert_eq!(file.parent().unwrap(), dir);
    }
}
