//! Three-way comparator.
//!
//! Classifies every row identity seen in Base, Local or Remote by presence
//! and content hash. Change detection is hash-only: there is no field-level
//! diff here.

use crate::report::{EntryValidation, Resolution, SyncEntry, SyncReport, SyncStatus};
use crate::{SyncError, SyncResult, SyncRow, SyncSide};
use std::collections::{HashMap, HashSet};
use tablesync_types::{ContentHash, RowId};
use tracing::{debug, info};

/// What the classifier needs to know about one side of a row.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    hash: ContentHash,
    deleted: bool,
}

impl Snapshot {
    fn of<R: SyncRow>(row: &R) -> Self {
        Self {
            hash: row.content_hash(),
            deleted: row.is_deleted(),
        }
    }
}

/// Compares three row collections and classifies every identity.
///
/// Entries keep first-seen order (Base, then Local, then Remote); callers
/// wanting display order sort afterwards (see [`crate::SyncEngine`]).
///
/// # Errors
///
/// Returns [`SyncError::DuplicateRowId`] if a collection contains the same
/// row id twice.
pub fn compare<R: SyncRow>(base: &[R], local: &[R], remote: &[R]) -> SyncResult<SyncReport<R>> {
    let base_map = index_rows(base, SyncSide::Base)?;
    let local_map = index_rows(local, SyncSide::Local)?;
    let remote_map = index_rows(remote, SyncSide::Remote)?;

    let mut seen = HashSet::with_capacity(base.len().max(local.len()).max(remote.len()));
    let ids: Vec<RowId> = base
        .iter()
        .chain(local)
        .chain(remote)
        .map(SyncRow::row_id)
        .filter(|id| seen.insert(*id))
        .collect();

    let entries: Vec<SyncEntry<R>> = ids
        .into_iter()
        .map(|row_id| {
            let base_row = base_map.get(&row_id).copied();
            let local_row = local_map.get(&row_id).copied();
            let remote_row = remote_map.get(&row_id).copied();
            build_entry(row_id, base_row, local_row, remote_row)
        })
        .collect();

    let report = SyncReport::new(entries);
    info!(
        "Compared {} base / {} local / {} remote rows: {}",
        base.len(),
        local.len(),
        remote.len(),
        report.summary_line()
    );
    Ok(report)
}

/// Classifies one identity from its three (optional) versions.
///
/// # Panics
///
/// Panics if all three versions are absent: an identity is only ever
/// classified because some collection contains it.
pub fn classify<R: SyncRow>(base: Option<&R>, local: Option<&R>, remote: Option<&R>) -> SyncStatus {
    classify_snapshots(
        base.map(Snapshot::of),
        local.map(Snapshot::of),
        remote.map(Snapshot::of),
    )
}

fn build_entry<R: SyncRow>(
    row_id: RowId,
    base: Option<&R>,
    local: Option<&R>,
    remote: Option<&R>,
) -> SyncEntry<R> {
    let base_snap = base.map(Snapshot::of);
    let local_snap = local.map(Snapshot::of);
    let remote_snap = remote.map(Snapshot::of);
    let status = classify_snapshots(base_snap, local_snap, remote_snap);
    debug!("Row {} classified as {}", row_id, status);

    SyncEntry {
        row_id,
        status,
        resolution: Resolution::Unresolved,
        base: base.cloned(),
        local: local.cloned(),
        remote: remote.cloned(),
        base_hash: base_snap.map(|s| s.hash),
        local_hash: local_snap.map(|s| s.hash),
        remote_hash: remote_snap.map(|s| s.hash),
        validation: EntryValidation::default(),
    }
}

fn index_rows<R: SyncRow>(rows: &[R], side: SyncSide) -> SyncResult<HashMap<RowId, &R>> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let row_id = row.row_id();
        if map.insert(row_id, row).is_some() {
            return Err(SyncError::DuplicateRowId {
                collection: side,
                row_id,
            });
        }
    }
    Ok(map)
}

fn classify_snapshots(
    base: Option<Snapshot>,
    local: Option<Snapshot>,
    remote: Option<Snapshot>,
) -> SyncStatus {
    match (base, local, remote) {
        (None, None, None) => {
            panic!("row identity present in none of base, local or remote")
        }
        (None, Some(_), None) => SyncStatus::AddedInLocal,
        (None, None, Some(_)) => SyncStatus::AddedInRemote,
        // Added on both sides under the same id.
        (None, Some(l), Some(r)) => {
            if l.hash == r.hash {
                SyncStatus::Unchanged
            } else {
                SyncStatus::Conflict
            }
        }
        // Exported, then vanished from both sides without a deletion marker.
        (Some(_), None, None) => SyncStatus::DeleteConflict,
        (Some(_), None, Some(_)) => SyncStatus::DeletedInLocal,
        (Some(_), Some(_), None) => SyncStatus::DeletedInRemote,
        (Some(b), Some(l), Some(r)) => classify_present(b, l, r),
    }
}

fn classify_present(base: Snapshot, local: Snapshot, remote: Snapshot) -> SyncStatus {
    let local_changed = local.hash != base.hash;
    let remote_changed = remote.hash != base.hash;
    if !local_changed && !remote_changed {
        return SyncStatus::Unchanged;
    }

    // A soft delete only counts as a deletion if Base was still live.
    let local_tombstoned = local.deleted && !base.deleted;
    let remote_tombstoned = remote.deleted && !base.deleted;
    match (local_tombstoned, remote_tombstoned) {
        (false, true) if local_changed => return SyncStatus::DeleteConflict,
        (false, true) => return SyncStatus::DeletedInRemote,
        (true, false) if remote_changed => return SyncStatus::DeleteConflict,
        (true, false) => return SyncStatus::DeletedInLocal,
        _ => {}
    }

    match (local_changed, remote_changed) {
        (true, false) => SyncStatus::ModifiedInLocal,
        (false, true) => SyncStatus::ModifiedInRemote,
        // Both changed: identical edits converge.
        _ if local.hash == remote.hash => SyncStatus::Unchanged,
        _ => SyncStatus::Conflict,
    }
}
