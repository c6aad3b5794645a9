mod common;

use common::{edited, make_row, tombstoned, TestRow};
use tablesync_merge::{
    all_resolved, auto_resolve_non_conflicts, compare, pending, requires_resolution, resolve,
    resolve_where, Resolution, ReviewPolicy, SyncError, SyncReport, SyncStatus,
};
use tablesync_types::RowId;

/// One row per status except the two conflicts, plus one of each conflict.
fn make_mixed_report() -> SyncReport<TestRow> {
    let same = make_row("Same", 0);
    let local_edit = make_row("LocalEdit", 0);
    let remote_edit = make_row("RemoteEdit", 0);
    let clash = make_row("Clash", 0);
    let gone_remote = make_row("GoneRemote", 0);
    let delete_clash = make_row("DeleteClash", 0);

    let base = vec![
        same.clone(),
        local_edit.clone(),
        remote_edit.clone(),
        clash.clone(),
        gone_remote.clone(),
        delete_clash.clone(),
    ];
    let local = vec![
        same.clone(),
        edited(&local_edit, 1),
        remote_edit.clone(),
        edited(&clash, 1),
        gone_remote.clone(),
        edited(&delete_clash, 1),
        make_row("AddedLocal", 0),
    ];
    let remote = vec![
        same,
        local_edit,
        edited(&remote_edit, 1),
        edited(&clash, 2),
        tombstoned(&delete_clash),
        make_row("AddedRemote", 0),
    ];
    compare(&base, &local, &remote).unwrap()
}

fn resolution_of(report: &SyncReport<TestRow>, status: SyncStatus) -> Resolution {
    report
        .entries
        .iter()
        .find(|e| e.status == status)
        .map(|e| e.resolution)
        .unwrap()
}

// ── Policy ───────────────────────────────────────────────────────

#[test]
fn strict_policy_requires_everything_but_unchanged() {
    for status in SyncStatus::ALL {
        assert_eq!(
            ReviewPolicy::Strict.requires_resolution(status),
            status != SyncStatus::Unchanged,
            "{status}"
        );
    }
}

#[test]
fn conflicts_only_policy_requires_conflicts() {
    for status in SyncStatus::ALL {
        assert_eq!(
            ReviewPolicy::ConflictsOnly.requires_resolution(status),
            status.is_conflict(),
            "{status}"
        );
    }
}

#[test]
fn default_policy_is_strict() {
    assert_eq!(ReviewPolicy::default(), ReviewPolicy::Strict);
}

#[test]
fn entry_level_check_follows_policy() {
    let report = make_mixed_report();
    let remote_edit = report
        .entries
        .iter()
        .find(|e| e.status == SyncStatus::ModifiedInRemote)
        .unwrap();
    assert!(requires_resolution(remote_edit, ReviewPolicy::Strict));
    assert!(!requires_resolution(remote_edit, ReviewPolicy::ConflictsOnly));
}

// ── Auto-resolve ─────────────────────────────────────────────────

#[test]
fn strict_auto_resolve_only_settles_unchanged() {
    let mut report = make_mixed_report();
    let settled = auto_resolve_non_conflicts(&mut report.entries, ReviewPolicy::Strict);

    assert_eq!(settled, 1);
    assert_eq!(
        resolution_of(&report, SyncStatus::Unchanged),
        Resolution::KeepLocal
    );
    for entry in &report.entries {
        if entry.status != SyncStatus::Unchanged {
            assert_eq!(entry.resolution, Resolution::Unresolved, "{}", entry.status);
        }
    }
    assert!(!all_resolved(&report.entries, ReviewPolicy::Strict));
}

#[test]
fn conflicts_only_auto_resolve_takes_implied_decisions() {
    let mut report = make_mixed_report();
    let settled = auto_resolve_non_conflicts(&mut report.entries, ReviewPolicy::ConflictsOnly);

    assert_eq!(settled, 6);
    assert_eq!(
        resolution_of(&report, SyncStatus::ModifiedInLocal),
        Resolution::KeepLocal
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::ModifiedInRemote),
        Resolution::KeepRemote
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::AddedInLocal),
        Resolution::KeepLocal
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::AddedInRemote),
        Resolution::KeepRemote
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::DeletedInRemote),
        Resolution::Delete
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::Conflict),
        Resolution::Unresolved
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::DeleteConflict),
        Resolution::Unresolved
    );
    assert_eq!(pending(&report.entries, ReviewPolicy::ConflictsOnly).len(), 2);
}

#[test]
fn implied_resolution_is_none_for_conflicts() {
    assert_eq!(Resolution::implied_by(SyncStatus::Conflict), None);
    assert_eq!(Resolution::implied_by(SyncStatus::DeleteConflict), None);
    assert_eq!(
        Resolution::implied_by(SyncStatus::DeletedInLocal),
        Some(Resolution::Delete)
    );
}

// ── Manual resolution ────────────────────────────────────────────

#[test]
fn resolving_every_pending_entry_completes_review() {
    let mut report = make_mixed_report();
    auto_resolve_non_conflicts(&mut report.entries, ReviewPolicy::Strict);

    for row_id in pending(&report.entries, ReviewPolicy::Strict) {
        resolve(&mut report.entries, row_id, Resolution::KeepRemote).unwrap();
    }
    assert!(all_resolved(&report.entries, ReviewPolicy::Strict));
    assert!(pending(&report.entries, ReviewPolicy::Strict).is_empty());
}

#[test]
fn resolving_unknown_row_fails() {
    let mut report = make_mixed_report();
    let missing = RowId::new();
    let err = resolve(&mut report.entries, missing, Resolution::Delete).unwrap_err();
    assert!(matches!(err, SyncError::RowNotFound(id) if id == missing));
}

#[test]
fn resolution_can_be_changed_back_to_unresolved() {
    let mut report = make_mixed_report();
    let conflict = report.conflicts().next().unwrap().row_id;

    resolve(&mut report.entries, conflict, Resolution::KeepBoth).unwrap();
    assert!(!pending(&report.entries, ReviewPolicy::Strict).contains(&conflict));

    resolve(&mut report.entries, conflict, Resolution::Unresolved).unwrap();
    assert!(pending(&report.entries, ReviewPolicy::Strict).contains(&conflict));
}

#[test]
fn resolve_where_accepts_all_remote_changes() {
    let mut report = make_mixed_report();
    let count = resolve_where(
        &mut report.entries,
        |e| matches!(e.status, SyncStatus::ModifiedInRemote | SyncStatus::AddedInRemote),
        Resolution::KeepRemote,
    );

    assert_eq!(count, 2);
    assert_eq!(
        resolution_of(&report, SyncStatus::AddedInRemote),
        Resolution::KeepRemote
    );
    assert_eq!(
        resolution_of(&report, SyncStatus::ModifiedInLocal),
        Resolution::Unresolved
    );
}

#[test]
fn requiring_resolution_lists_entries_for_review() {
    let report = make_mixed_report();
    assert_eq!(report.requiring_resolution(ReviewPolicy::Strict).count(), 7);
    assert_eq!(
        report.requiring_resolution(ReviewPolicy::ConflictsOnly).count(),
        2
    );
}
