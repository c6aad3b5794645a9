//! Sync engine: compare, resolve and apply under one configuration.

use crate::applicator::{MergeApplier, MergeResult};
use crate::comparator;
use crate::report::{Resolution, SyncReport};
use crate::resolver::{self, ReviewPolicy};
use crate::{SyncResult, SyncRow};
use serde::{Deserialize, Serialize};
use tablesync_types::RowId;
use tracing::debug;

/// Configuration for the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Which changes need an explicit decision before a merge.
    pub review_policy: ReviewPolicy,
    /// Order entries by display name (then row id) after comparison.
    pub sort_entries: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            review_policy: ReviewPolicy::Strict,
            sort_entries: true,
        }
    }
}

/// The sync engine. Holds no state besides its configuration; each sync
/// cycle lives in the [`SyncReport`] it returns.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    config: SyncConfig,
}

impl SyncEngine {
    /// Creates a sync engine.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the review policy in force.
    pub fn policy(&self) -> ReviewPolicy {
        self.config.review_policy
    }

    /// Compares Base, Local and Remote.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::DuplicateRowId`] if a collection repeats
    /// a row id.
    pub fn compare<R: SyncRow>(
        &self,
        base: &[R],
        local: &[R],
        remote: &[R],
    ) -> SyncResult<SyncReport<R>> {
        let mut report = comparator::compare(base, local, remote)?;
        if self.config.sort_entries {
            sort_entries(&mut report);
        }
        Ok(report)
    }

    /// Settles every entry that needs no review; returns how many were set.
    pub fn auto_resolve<R>(&self, report: &mut SyncReport<R>) -> usize {
        resolver::auto_resolve_non_conflicts(&mut report.entries, self.policy())
    }

    /// Returns true iff the report can be merged.
    pub fn all_resolved<R>(&self, report: &SyncReport<R>) -> bool {
        resolver::all_resolved(&report.entries, self.policy())
    }

    /// Ids of entries still waiting for a decision.
    pub fn pending<R>(&self, report: &SyncReport<R>) -> Vec<RowId> {
        resolver::pending(&report.entries, self.policy())
    }

    /// Records a decision for one row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::RowNotFound`] if the report has no such row.
    pub fn resolve<R>(
        &self,
        report: &mut SyncReport<R>,
        row_id: RowId,
        resolution: Resolution,
    ) -> SyncResult<()> {
        resolver::resolve(&mut report.entries, row_id, resolution)
    }

    /// Produces the merged rows.
    ///
    /// # Panics
    ///
    /// Panics if [`SyncEngine::all_resolved`] does not hold.
    pub fn apply<R: SyncRow>(&self, report: &SyncReport<R>) -> MergeResult<R> {
        MergeApplier::new(self.policy()).apply(&report.entries)
    }

    /// Produces the merged rows, or an error if decisions are missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::UnresolvedEntries`] if any entry still
    /// needs a decision.
    pub fn try_apply<R: SyncRow>(&self, report: &SyncReport<R>) -> SyncResult<MergeResult<R>> {
        MergeApplier::new(self.policy()).try_apply(&report.entries)
    }
}

fn sort_entries<R: SyncRow>(report: &mut SyncReport<R>) {
    report
        .entries
        .sort_by_cached_key(|entry| (entry.display_name(), entry.row_id));
    debug!("Sorted {} entries by display name", report.entries.len());
}
