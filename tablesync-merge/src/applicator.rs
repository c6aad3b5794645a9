//! Merge applicator - turns resolved sync entries into the final row set.
//!
//! The applicator never decides on its own that an unreviewed change is
//! fine: every entry the review policy marks as needing a decision must carry
//! one before a merge is produced.

use crate::report::{Resolution, SyncEntry, SyncStatus};
use crate::resolver::{self, ReviewPolicy};
use crate::{SyncError, SyncResult, SyncRow, SyncSide};
use tablesync_types::{RowId, RowStatus};
use tracing::{debug, info, warn};

/// Merged rows ready for the host to persist.
#[derive(Debug, Clone)]
pub struct MergeResult<R> {
    /// Final rows, replacing the current table contents.
    pub merged_rows: Vec<R>,
    /// Rows taken from Local because of a decision.
    pub applied_from_local: usize,
    /// Rows taken from Remote because of a decision.
    pub applied_from_remote: usize,
    /// Identities removed by the merge.
    pub deleted: usize,
    /// Rows carried over from `Unchanged` entries.
    pub unchanged: usize,
    /// Entries split into fresh identities by [`Resolution::KeepBoth`].
    pub split: usize,
}

impl<R> Default for MergeResult<R> {
    fn default() -> Self {
        Self {
            merged_rows: Vec::new(),
            applied_from_local: 0,
            applied_from_remote: 0,
            deleted: 0,
            unchanged: 0,
            split: 0,
        }
    }
}

impl<R> MergeResult<R> {
    /// Returns true if the merge changed anything relative to Local.
    pub fn has_changes(&self) -> bool {
        self.applied_from_remote > 0 || self.deleted > 0 || self.split > 0
    }
}

/// Applies resolved entries under a review policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeApplier {
    policy: ReviewPolicy,
}

impl MergeApplier {
    /// Creates a merge applicator for `policy`.
    pub fn new(policy: ReviewPolicy) -> Self {
        Self { policy }
    }

    /// Returns the review policy in force.
    pub fn policy(&self) -> ReviewPolicy {
        self.policy
    }

    /// Produces the merged rows.
    ///
    /// # Panics
    ///
    /// Panics if any entry that needs a decision is still unresolved. Hosts
    /// are expected to block the merge until [`resolver::all_resolved`]
    /// holds; use [`MergeApplier::try_apply`] to get an error instead.
    pub fn apply<R: SyncRow>(&self, entries: &[SyncEntry<R>]) -> MergeResult<R> {
        let outstanding = resolver::pending(entries, self.policy);
        assert!(
            outstanding.is_empty(),
            "merge applied with {} unresolved entries (first: {}); check all_resolved first",
            outstanding.len(),
            outstanding[0]
        );
        self.apply_unchecked(entries)
    }

    /// Produces the merged rows, or reports the first unresolved entry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnresolvedEntries`] if any entry that needs a
    /// decision is still unresolved.
    pub fn try_apply<R: SyncRow>(&self, entries: &[SyncEntry<R>]) -> SyncResult<MergeResult<R>> {
        let mut outstanding = entries.iter().filter(|e| !e.is_settled(self.policy));
        if let Some(first) = outstanding.next() {
            return Err(SyncError::UnresolvedEntries {
                count: 1 + outstanding.count(),
                first: first.row_id,
                status: first.status,
            });
        }
        Ok(self.apply_unchecked(entries))
    }

    fn apply_unchecked<R: SyncRow>(&self, entries: &[SyncEntry<R>]) -> MergeResult<R> {
        let mut result = MergeResult::default();
        for entry in entries {
            apply_entry(entry, &mut result);
        }
        info!(
            "Merged {} rows ({} unchanged, {} from local, {} from remote, {} deleted)",
            result.merged_rows.len(),
            result.unchanged,
            result.applied_from_local,
            result.applied_from_remote,
            result.deleted
        );
        result
    }
}

/// Produces the merged rows; see [`MergeApplier::apply`].
///
/// # Panics
///
/// Panics if any entry that needs a decision under `policy` is unresolved.
pub fn apply_merge<R: SyncRow>(entries: &[SyncEntry<R>], policy: ReviewPolicy) -> MergeResult<R> {
    MergeApplier::new(policy).apply(entries)
}

/// Produces the merged rows; see [`MergeApplier::try_apply`].
///
/// # Errors
///
/// Returns [`SyncError::UnresolvedEntries`] if any entry that needs a
/// decision under `policy` is unresolved.
pub fn try_apply_merge<R: SyncRow>(
    entries: &[SyncEntry<R>],
    policy: ReviewPolicy,
) -> SyncResult<MergeResult<R>> {
    MergeApplier::new(policy).try_apply(entries)
}

fn apply_entry<R: SyncRow>(entry: &SyncEntry<R>, result: &mut MergeResult<R>) {
    let resolution = match entry.resolution {
        Resolution::Unresolved => {
            // Only entries the policy lets through unreviewed get here.
            let fallback = Resolution::implied_by(entry.status).unwrap_or(Resolution::KeepLocal);
            if entry.status != SyncStatus::Unchanged {
                warn!(
                    "Row {} ({}) reached merge unresolved; applying {}",
                    entry.row_id, entry.status, fallback
                );
            }
            fallback
        }
        other => other,
    };

    debug!("Applying {} to row {} ({})", resolution, entry.row_id, entry.status);

    match resolution {
        Resolution::KeepLocal if entry.status == SyncStatus::Unchanged => {
            // Identical content: prefer Local, fall back to the Remote copy
            // of a same-content addition.
            match entry.local.as_ref().or(entry.remote.as_ref()) {
                Some(row) => {
                    let mut row = row.clone();
                    row.mark(RowStatus::Synced);
                    result.merged_rows.push(row);
                    result.unchanged += 1;
                }
                None => result.deleted += 1,
            }
        }
        Resolution::KeepLocal => match &entry.local {
            Some(row) => {
                result
                    .merged_rows
                    .push(marked(row, entry_row_status(entry)));
                result.applied_from_local += 1;
            }
            None => result.deleted += 1,
        },
        Resolution::KeepRemote => match &entry.remote {
            Some(row) => {
                result
                    .merged_rows
                    .push(marked(row, entry_row_status(entry)));
                result.applied_from_remote += 1;
            }
            None => result.deleted += 1,
        },
        Resolution::KeepBoth => {
            let before = result.merged_rows.len();
            if let Some(row) = &entry.local {
                result
                    .merged_rows
                    .push(split_copy(row, SyncSide::Local, RowStatus::Modified));
                result.applied_from_local += 1;
            }
            if let Some(row) = &entry.remote {
                result
                    .merged_rows
                    .push(split_copy(row, SyncSide::Remote, RowStatus::New));
                result.applied_from_remote += 1;
            }
            if result.merged_rows.len() == before {
                result.deleted += 1;
            } else {
                result.split += 1;
            }
        }
        Resolution::Delete => result.deleted += 1,
        Resolution::Unresolved => unreachable!("unresolved entries take a fallback above"),
    }
}

/// Status recorded on a row taken as-is from one side.
fn entry_row_status<R>(entry: &SyncEntry<R>) -> RowStatus {
    if entry.base.is_none() {
        RowStatus::New
    } else {
        RowStatus::Modified
    }
}

fn marked<R: SyncRow>(row: &R, status: RowStatus) -> R {
    let mut row = row.clone();
    row.mark(status);
    row
}

/// Copy for a "keep both" split: never reuses the original identity.
fn split_copy<R: SyncRow>(row: &R, side: SyncSide, status: RowStatus) -> R {
    let mut copy = row.clone();
    copy.set_row_id(RowId::new());
    copy.disambiguate(side);
    copy.mark(status);
    copy
}
