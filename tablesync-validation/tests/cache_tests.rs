mod common;

use common::{make_row, LevelValidator, TestRow};
use pretty_assertions::assert_eq;
use tablesync_types::{RowId, VersionToken};
use tablesync_validation::{
    CacheStats, StalenessCache, Validatable, ValidationCache, ValidationError, ValidationState,
};

fn make_cache() -> StalenessCache<LevelValidator> {
    StalenessCache::new(LevelValidator::default())
}

fn calls(cache: &StalenessCache<LevelValidator>) -> usize {
    cache.validator().calls.get()
}

// ── Single row ───────────────────────────────────────────────────

#[test]
fn first_validation_runs_and_stores_result() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("Guard", 0);
    let all = vec![row.clone()];

    let issues = cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(issues.len(), 1);
    assert_eq!(row.validation().state, ValidationState::Invalid);
    assert_eq!(row.validation().issue_count, 1);
    assert_eq!(row.validation().summary, "Level must be at least 1");
    assert!(row.validation().input_hash.is_some());
    assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1 });
}

#[test]
fn warnings_alone_leave_row_valid() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("Titan", 90);
    let all = vec![row.clone()];

    let issues = cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(issues.len(), 1);
    assert_eq!(row.validation().state, ValidationState::Valid);
    assert_eq!(row.validation().issue_count, 1);
}

#[test]
fn summary_joins_messages() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("", 0);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(
        row.validation().summary,
        "Name is required; Level must be at least 1"
    );
    assert_eq!(row.validation().issue_count, 2);
}

#[test]
fn unchanged_row_is_answered_from_cache() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("Guard", 0);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    let second = cache.validate_and_cache(&mut row, &all, &version);

    assert!(second.is_empty());
    assert_eq!(calls(&cache), 1);
    assert_eq!(row.validation().state, ValidationState::Invalid);
    assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
}

#[test]
fn editing_a_field_forces_revalidation() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("Guard", 0);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    row.level = 5;
    let issues = cache.validate_and_cache(&mut row, &all, &version);

    assert!(issues.is_empty());
    assert_eq!(calls(&cache), 2);
    assert_eq!(row.validation().state, ValidationState::Valid);
    assert_eq!(row.validation().summary, "");
}

#[test]
fn bumping_version_forces_revalidation() {
    let mut cache = make_cache();
    let mut version = VersionToken::new();
    let mut row = make_row("Guard", 3);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    let hash_before = row.validation().input_hash;
    version.bump();
    cache.validate_and_cache(&mut row, &all, &version);

    assert_eq!(calls(&cache), 2);
    assert_ne!(row.validation().input_hash, hash_before);
}

#[test]
fn repeated_calls_validate_once_per_version() {
    let mut cache = make_cache();
    let mut version = VersionToken::new();
    let mut row = make_row("Guard", 3);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(calls(&cache), 1);

    version.bump();
    cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(calls(&cache), 2);
}

#[test]
fn invalidated_row_is_revalidated() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("Guard", 3);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    row.validation_mut().invalidate();
    assert_eq!(row.validation(), &ValidationCache::default());

    cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(calls(&cache), 2);
}

#[test]
fn unknown_state_with_matching_hash_is_not_a_hit() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut row = make_row("Guard", 3);
    let all = vec![row.clone()];

    cache.validate_and_cache(&mut row, &all, &version);
    row.validation_mut().state = ValidationState::Unknown;
    cache.validate_and_cache(&mut row, &all, &version);
    assert_eq!(calls(&cache), 2);
}

// ── Whole table ──────────────────────────────────────────────────

fn make_table() -> Vec<TestRow> {
    let mut gone = make_row("Ghost", 0);
    gone.deleted = true;
    vec![
        make_row("Guard", 3),
        make_row("Merchant", 0),
        make_row("Guard", 4),
        gone,
    ]
}

#[test]
fn validate_all_skips_deleted_rows() {
    let mut cache = make_cache();
    let mut rows = make_table();
    let report = cache.validate_all_and_cache(&mut rows, &VersionToken::new());

    assert_eq!(report.rows_validated, 3);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.rows_cached, 0);
    assert_eq!(calls(&cache), 3);
    assert_eq!(rows[3].validation().state, ValidationState::Unknown);
}

#[test]
fn validate_all_reports_cross_row_issues() {
    let mut cache = make_cache();
    let mut rows = make_table();
    let report = cache.validate_all_and_cache(&mut rows, &VersionToken::new());

    // Two duplicate names plus one level error.
    assert_eq!(report.error_count(), 3);
    assert!(report.has_errors());
    assert!(!report.has_warnings());
    assert_eq!(rows[0].validation().summary, "Name must be unique");
    assert_eq!(rows[1].validation().state, ValidationState::Invalid);
}

#[test]
fn second_pass_over_unchanged_table_is_all_hits() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut rows = make_table();

    cache.validate_all_and_cache(&mut rows, &version);
    cache.reset_stats();
    let report = cache.validate_all_and_cache(&mut rows, &version);

    assert_eq!(report.rows_cached, 3);
    assert_eq!(report.rows_validated, 0);
    assert!(report.issues.is_empty());
    assert_eq!(cache.stats(), CacheStats { hits: 3, misses: 0 });
}

#[test]
fn editing_one_row_revalidates_only_that_row() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut rows = make_table();

    cache.validate_all_and_cache(&mut rows, &version);
    rows[1].level = 7;
    let report = cache.validate_all_and_cache(&mut rows, &version);

    assert_eq!(report.rows_validated, 1);
    assert_eq!(report.rows_cached, 2);
    assert_eq!(rows[1].validation().state, ValidationState::Valid);
}

#[test]
fn validate_by_id_updates_row_in_place() {
    let mut cache = make_cache();
    let version = VersionToken::new();
    let mut rows = make_table();
    let target = rows[1].id;

    let issues = cache.validate_row_by_id(&mut rows, target, &version).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(rows[1].validation().state, ValidationState::Invalid);
    assert_eq!(rows[0].validation().state, ValidationState::Unknown);
}

#[test]
fn validate_by_unknown_id_fails() {
    let mut cache = make_cache();
    let mut rows = make_table();
    let missing = RowId::new();
    let err = cache
        .validate_row_by_id(&mut rows, missing, &VersionToken::new())
        .unwrap_err();
    assert!(matches!(err, ValidationError::RowNotFound(id) if id == missing));
}

#[test]
fn validation_cache_round_trips_through_json() {
    let mut cache = make_cache();
    let mut row = make_row("Guard", 0);
    let all = vec![row.clone()];
    cache.validate_and_cache(&mut row, &all, &VersionToken::new());

    let json = serde_json::to_string(row.validation()).unwrap();
    let back: ValidationCache = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, row.validation());
}
