mod common;

use common::{edited, make_row, tombstoned, TestRow};
use pretty_assertions::assert_eq;
use tablesync_merge::{
    Resolution, ReviewPolicy, SyncConfig, SyncEngine, SyncError, SyncStatus,
};
use tablesync_types::RowId;

fn make_engine() -> SyncEngine {
    SyncEngine::new(SyncConfig::default())
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn default_config_is_strict_and_sorted() {
    let config = SyncConfig::default();
    assert_eq!(config.review_policy, ReviewPolicy::Strict);
    assert!(config.sort_entries);
}

#[test]
fn config_reads_partial_json() {
    let config: SyncConfig = serde_json::from_str(r#"{"review_policy":"conflicts_only"}"#).unwrap();
    assert_eq!(config.review_policy, ReviewPolicy::ConflictsOnly);
    assert!(config.sort_entries);
}

#[test]
fn config_round_trips_through_json() {
    let config = SyncConfig {
        review_policy: ReviewPolicy::ConflictsOnly,
        sort_entries: false,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: SyncConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn entries_are_sorted_by_display_name() {
    let zed = make_row("Zed", 1);
    let alpha = make_row("Alpha", 1);
    let mid = make_row("Mid", 1);
    let report = make_engine()
        .compare(&[zed.clone()], &[alpha.clone()], &[mid.clone()])
        .unwrap();

    let ids: Vec<RowId> = report.entries.iter().map(|e| e.row_id).collect();
    assert_eq!(ids, vec![alpha.id, mid.id, zed.id]);
}

#[test]
fn sorting_can_be_disabled() {
    let zed = make_row("Zed", 1);
    let alpha = make_row("Alpha", 1);
    let engine = SyncEngine::new(SyncConfig {
        sort_entries: false,
        ..SyncConfig::default()
    });
    let report = engine.compare(&[zed.clone()], &[alpha.clone()], &[]).unwrap();

    let ids: Vec<RowId> = report.entries.iter().map(|e| e.row_id).collect();
    assert_eq!(ids, vec![zed.id, alpha.id]);
}

#[test]
fn deleted_local_entry_is_named_from_remote() {
    let row = make_row("Guard", 1);
    let report = make_engine()
        .compare(&[row.clone()], &[], &[row.clone()])
        .unwrap();
    assert_eq!(report.entries[0].display_name(), "Guard");
}

// ── Full cycle ───────────────────────────────────────────────────

#[test]
fn clean_roundtrip_merges_without_review() {
    let rows: Vec<TestRow> = (0..3).map(|i| make_row(&format!("Npc{i}"), i)).collect();
    let engine = make_engine();
    let mut report = engine.compare(&rows, &rows, &rows).unwrap();

    assert_eq!(engine.auto_resolve(&mut report), 3);
    assert!(engine.all_resolved(&report));
    let result = engine.apply(&report);
    assert_eq!(result.merged_rows.len(), 3);
    assert_eq!(result.unchanged, 3);
}

#[test]
fn remote_edit_needs_review_then_applies() {
    let row = make_row("Guard", 1);
    let engine = make_engine();
    let mut report = engine
        .compare(&[row.clone()], &[row.clone()], &[edited(&row, 7)])
        .unwrap();
    engine.auto_resolve(&mut report);

    assert_eq!(report.entries[0].status, SyncStatus::ModifiedInRemote);
    assert_eq!(engine.pending(&report), vec![row.id]);
    assert!(!engine.all_resolved(&report));

    engine.resolve(&mut report, row.id, Resolution::KeepRemote).unwrap();
    let result = engine.try_apply(&report).unwrap();
    assert_eq!(result.merged_rows[0].value, 7);
}

#[test]
fn conflicts_only_engine_settles_one_sided_changes() {
    let row = make_row("Guard", 1);
    let gone = make_row("Thief", 1);
    let engine = SyncEngine::new(SyncConfig {
        review_policy: ReviewPolicy::ConflictsOnly,
        ..SyncConfig::default()
    });
    assert_eq!(engine.policy(), ReviewPolicy::ConflictsOnly);

    let mut report = engine
        .compare(
            &[row.clone(), gone.clone()],
            &[row.clone(), gone.clone()],
            &[edited(&row, 7), tombstoned(&gone)],
        )
        .unwrap();
    engine.auto_resolve(&mut report);
    assert!(engine.all_resolved(&report));

    let result = engine.apply(&report);
    assert_eq!(result.merged_rows.len(), 1);
    assert_eq!(result.merged_rows[0].value, 7);
    assert_eq!(result.deleted, 1);
}

#[test]
fn try_apply_refuses_pending_conflict() {
    let row = make_row("Guard", 1);
    let engine = make_engine();
    let report = engine
        .compare(&[row.clone()], &[edited(&row, 2)], &[edited(&row, 3)])
        .unwrap();

    let err = engine.try_apply(&report).unwrap_err();
    assert!(matches!(err, SyncError::UnresolvedEntries { count: 1, .. }));
    assert!(err.to_string().contains("conflict"));
}

#[test]
fn resolve_unknown_row_through_engine_fails() {
    let row = make_row("Guard", 1);
    let engine = make_engine();
    let mut report = engine.compare(&[row.clone()], &[row.clone()], &[row]).unwrap();
    let err = engine
        .resolve(&mut report, RowId::new(), Resolution::KeepLocal)
        .unwrap_err();
    assert!(matches!(err, SyncError::RowNotFound(_)));
}
