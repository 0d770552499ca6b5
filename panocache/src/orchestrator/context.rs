//! State carried between sync passes.

use std::collections::HashMap;

use super::types::SyncReport;
use crate::challenge::ChallengeKey;

/// Owned by whoever drives the passes (one-shot command or reactor worker)
/// and handed to each [`super::FetchOrchestrator::sync_all`].
#[derive(Debug, Default)]
pub struct SyncContext {
    passes: u64,
    reports: HashMap<ChallengeKey, SyncReport>,
}

impl SyncContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Latest report for a challenge.
    pub fn last_report(&self, key: &ChallengeKey) -> Option<&SyncReport> {
        self.reports.get(key)
    }

    /// All latest reports.
    pub fn reports(&self) -> impl Iterator<Item = &SyncReport> {
        self.reports.values()
    }

    pub(crate) fn begin_pass(&mut self) -> u64 {
        self.passes += 1;
        self.passes
    }

    pub(crate) fn record(&mut self, report: SyncReport) {
        self.reports.insert(report.key.clone(), report);
    }
}
