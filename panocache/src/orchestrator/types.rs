//! Orchestrator types

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::challenge::ChallengeKey;
use crate::staleness::Staleness;

/// Default number of tiles fetched concurrently.
pub const DEFAULT_BATCH_WIDTH: usize = 15;

/// Which coordinates are fetched when a cache entry is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefetchScope {
    /// Every pyramid coordinate
    #[default]
    Full,
    /// Only coordinates without a tile file, when the panorama is unchanged
    Missing,
}

impl fmt::Display for RefetchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefetchScope::Full => write!(f, "full"),
            RefetchScope::Missing => write!(f, "missing"),
        }
    }
}

impl FromStr for RefetchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(RefetchScope::Full),
            "missing" => Ok(RefetchScope::Missing),
            other => Err(format!("unknown refetch scope '{}'", other)),
        }
    }
}

/// Settings for a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Tiles fetched concurrently per batch
    pub batch_width: usize,
    /// Extra pause after the last batch, before metadata is written
    pub write_grace: Duration,
    /// Which coordinates are fetched on refresh
    pub refetch: RefetchScope,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_width: DEFAULT_BATCH_WIDTH,
            write_grace: Duration::ZERO,
            refetch: RefetchScope::Full,
        }
    }
}

impl SyncConfig {
    pub fn with_batch_width(mut self, batch_width: usize) -> Self {
        self.batch_width = batch_width;
        self
    }

    pub fn with_write_grace(mut self, write_grace: Duration) -> Self {
        self.write_grace = write_grace;
        self
    }

    pub fn with_refetch(mut self, refetch: RefetchScope) -> Self {
        self.refetch = refetch;
        self
    }
}

/// Outcome of one challenge sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No panorama id; nothing was done
    Skipped,
    /// Cache was fresh; no network I/O
    UpToDate,
    /// Tiles were fetched and metadata written
    Fetched,
    /// The cache entry could not be prepared or finalized
    Failed(String),
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Skipped => write!(f, "skipped"),
            SyncStatus::UpToDate => write!(f, "up to date"),
            SyncStatus::Fetched => write!(f, "fetched"),
            SyncStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-tile counters of one challenge sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Tiles attempted
    pub total: u64,
    /// Tiles downloaded and stored
    pub succeeded: u64,
    /// Tiles the service reported as not available (HTTP 400)
    pub unavailable: u64,
    /// Tiles that failed for any other reason
    pub failed: u64,
    /// Batches run
    pub batches: u64,
}

impl FetchStats {
    /// Whether every attempted tile was stored.
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Result of syncing one challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub key: ChallengeKey,
    pub status: SyncStatus,
    /// Cache verdict before the sync; `None` when skipped before evaluation
    pub staleness: Option<Staleness>,
    pub stats: FetchStats,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn total(&self) -> u64 {
        self.stats.total
    }

    pub fn succeeded(&self) -> u64 {
        self.stats.succeeded
    }
}

/// Aggregate of one pass over the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    /// 1-based pass number within the owning [`super::SyncContext`]
    pub pass: u64,
    pub challenges: usize,
    pub skipped: usize,
    pub up_to_date: usize,
    pub fetched: usize,
    pub failed: usize,
    pub tiles_succeeded: u64,
    pub tiles_total: u64,
    pub elapsed: Duration,
}

impl PassSummary {
    pub(crate) fn new(pass: u64) -> Self {
        Self {
            pass,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, report: &SyncReport) {
        self.challenges += 1;
        match report.status {
            SyncStatus::Skipped => self.skipped += 1,
            SyncStatus::UpToDate => self.up_to_date += 1,
            SyncStatus::Fetched => self.fetched += 1,
            SyncStatus::Failed(_) => self.failed += 1,
        }
        self.tiles_succeeded += report.stats.succeeded;
        self.tiles_total += report.stats.total;
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} challenges ({} fetched, {} up to date, {} skipped, {} failed), {}/{} tiles in {:.2}s",
            self.challenges,
            self.fetched,
            self.up_to_date,
            self.skipped,
            self.failed,
            self.tiles_succeeded,
            self.tiles_total,
            self.elapsed.as_secs_f64()
        )
    }
}
