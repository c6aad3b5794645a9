mod common;

use common::make_row;
use tablesync_validation::{table_hash, GenerationTracker, Severity, ValidationIssue};

// ── Generation tracking ──────────────────────────────────────────

#[test]
fn never_generated_table_is_out_of_date() {
    let rows = vec![make_row("Guard", 3)];
    assert!(GenerationTracker::new().is_out_of_date(&rows));
}

#[test]
fn successful_generation_records_hash() {
    let mut rows = vec![make_row("Guard", 3)];
    let mut tracker = GenerationTracker::new();
    tracker.on_generation_complete(&rows, 0);

    assert!(!tracker.is_out_of_date(&rows));
    assert_eq!(tracker.last_generated_hash, Some(table_hash(&rows)));
    assert!(tracker.last_generated_at.is_some());

    rows[0].level = 4;
    assert!(tracker.is_out_of_date(&rows));
}

#[test]
fn failed_generation_keeps_previous_hash() {
    let rows = vec![make_row("Guard", 3)];
    let mut tracker = GenerationTracker::new();
    tracker.on_generation_complete(&rows, 0);
    let hash = tracker.last_generated_hash;

    let edited = vec![make_row("Merchant", 5)];
    tracker.on_generation_complete(&edited, 2);
    assert_eq!(tracker.last_generated_hash, hash);
    assert_eq!(tracker.last_failure_count, 2);
    assert!(tracker.is_out_of_date(&edited));
}

#[test]
fn table_hash_depends_on_row_order() {
    let a = make_row("Guard", 3);
    let b = make_row("Merchant", 3);
    assert_ne!(
        table_hash(&[a.clone(), b.clone()]),
        table_hash(&[b, a])
    );
}

#[test]
fn tracker_round_trips_through_json() {
    let mut tracker = GenerationTracker::new();
    tracker.on_generation_complete(&[make_row("Guard", 3)], 0);
    let json = serde_json::to_string(&tracker).unwrap();
    let back: GenerationTracker = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tracker);
}

// ── Issue formatting ─────────────────────────────────────────────

#[test]
fn issue_display_with_field() {
    let issue = ValidationIssue::error("Guard", "MinLevel", "Min Level must be at least 1");
    assert_eq!(
        issue.to_string(),
        "[ERROR] Guard.MinLevel: Min Level must be at least 1"
    );
}

#[test]
fn issue_display_without_field() {
    let issue = ValidationIssue::new(Severity::Warning, "MainQuest", None, "Quest has no Success state");
    assert_eq!(
        issue.to_string(),
        "[WARNING] MainQuest: Quest has no Success state"
    );
}

#[test]
fn empty_field_name_is_treated_as_no_field() {
    let issue = ValidationIssue::warning("Guard", "", "odd");
    assert_eq!(issue.field, None);
}
