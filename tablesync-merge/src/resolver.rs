//! Conflict resolver: which entries need a decision, and recording them.

use crate::report::{Resolution, SyncEntry, SyncStatus};
use crate::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use tablesync_types::RowId;
use tracing::debug;

/// Which changes must be approved by a person before a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPolicy {
    /// Every status except `Unchanged` needs an explicit decision.
    #[default]
    Strict,
    /// Only `Conflict` and `DeleteConflict` need a decision; one-sided
    /// changes are accepted automatically.
    ConflictsOnly,
}

impl ReviewPolicy {
    /// Whether an entry with `status` needs an explicit decision.
    #[must_use]
    pub const fn requires_resolution(&self, status: SyncStatus) -> bool {
        match self {
            Self::Strict => !matches!(status, SyncStatus::Unchanged),
            Self::ConflictsOnly => status.is_conflict(),
        }
    }
}

impl Resolution {
    /// The decision a one-sided change implies, if there is one.
    ///
    /// Conflicts have no implied decision.
    #[must_use]
    pub const fn implied_by(status: SyncStatus) -> Option<Resolution> {
        match status {
            SyncStatus::Unchanged | SyncStatus::ModifiedInLocal | SyncStatus::AddedInLocal => {
                Some(Resolution::KeepLocal)
            }
            SyncStatus::ModifiedInRemote | SyncStatus::AddedInRemote => {
                Some(Resolution::KeepRemote)
            }
            SyncStatus::DeletedInLocal | SyncStatus::DeletedInRemote => Some(Resolution::Delete),
            SyncStatus::Conflict | SyncStatus::DeleteConflict => None,
        }
    }
}

/// Whether `entry` needs an explicit decision under `policy`.
pub fn requires_resolution<R>(entry: &SyncEntry<R>, policy: ReviewPolicy) -> bool {
    policy.requires_resolution(entry.status)
}

/// Settles every entry that needs no review and returns how many were set.
///
/// `Unchanged` entries become `KeepLocal` (a no-op merge). Under
/// [`ReviewPolicy::ConflictsOnly`] one-sided changes also take their implied
/// decision. Everything else is left untouched.
pub fn auto_resolve_non_conflicts<R>(entries: &mut [SyncEntry<R>], policy: ReviewPolicy) -> usize {
    let mut resolved = 0;
    for entry in entries.iter_mut() {
        if policy.requires_resolution(entry.status) {
            continue;
        }
        if let Some(resolution) = Resolution::implied_by(entry.status) {
            entry.resolution = resolution;
            resolved += 1;
        }
    }
    debug!("Auto-resolved {} of {} entries", resolved, entries.len());
    resolved
}

/// Returns true iff no entry that needs a decision is still unresolved.
pub fn all_resolved<R>(entries: &[SyncEntry<R>], policy: ReviewPolicy) -> bool {
    entries.iter().all(|e| e.is_settled(policy))
}

/// Ids of entries still waiting for a decision.
pub fn pending<R>(entries: &[SyncEntry<R>], policy: ReviewPolicy) -> Vec<RowId> {
    entries
        .iter()
        .filter(|e| !e.is_settled(policy))
        .map(|e| e.row_id)
        .collect()
}

/// Records a decision for one row.
///
/// # Errors
///
/// Returns [`SyncError::RowNotFound`] if no entry has `row_id`.
pub fn resolve<R>(
    entries: &mut [SyncEntry<R>],
    row_id: RowId,
    resolution: Resolution,
) -> SyncResult<()> {
    let entry = entries
        .iter_mut()
        .find(|e| e.row_id == row_id)
        .ok_or(SyncError::RowNotFound(row_id))?;
    debug!(
        "Resolved row {} ({}) as {}",
        row_id, entry.status, resolution
    );
    entry.resolution = resolution;
    Ok(())
}

/// Records the same decision for every entry matching `predicate`
/// (e.g. "accept all remote modifications"). Returns how many matched.
pub fn resolve_where<R, F>(entries: &mut [SyncEntry<R>], mut predicate: F, resolution: Resolution) -> usize
where
    F: FnMut(&SyncEntry<R>) -> bool,
{
    let mut count = 0;
    for entry in entries.iter_mut() {
        if predicate(entry) {
            entry.resolution = resolution;
            count += 1;
        }
    }
    debug!("Bulk-resolved {} entries as {}", count, resolution);
    count
}
