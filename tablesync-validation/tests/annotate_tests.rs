mod common;

use common::{make_row, LevelValidator, TestRow};
use pretty_assertions::assert_eq;
use tablesync_merge::{compare, ValidityLevel};
use tablesync_validation::{annotate_remote, RowValidator};

#[test]
fn remote_rows_are_annotated_with_worst_severity() {
    let ok = make_row("Guard", 3);
    let broken = make_row("Merchant", 3);
    let loud = make_row("Titan", 3);

    let base = vec![ok.clone(), broken.clone(), loud.clone()];
    let remote = vec![
        ok.clone(),
        TestRow {
            level: 0,
            ..broken.clone()
        },
        TestRow {
            level: 99,
            ..loud.clone()
        },
    ];
    let mut report = compare(&base, &base, &remote).unwrap();
    let errors = annotate_remote(&mut report, &LevelValidator::default());

    assert_eq!(errors, 1);
    assert_eq!(report.validation_errors, 1);
    assert_eq!(report.validation_warnings, 1);
    assert!(report.has_validation_errors());

    let entry = report.entry(broken.id).unwrap();
    assert_eq!(entry.validation.level, ValidityLevel::Error);
    assert_eq!(
        entry.validation.messages,
        vec!["[ERROR] Merchant.Level: Level must be at least 1".to_string()]
    );
    assert_eq!(
        report.entry(loud.id).unwrap().validation.level,
        ValidityLevel::Warning
    );
    assert_eq!(
        report.entry(ok.id).unwrap().validation.level,
        ValidityLevel::Valid
    );
}

#[test]
fn uniqueness_is_checked_among_remote_rows() {
    let a = make_row("Guard", 3);
    let b = make_row("Guard", 3);
    let mut report = compare(&[], &[], &[a.clone(), b]).unwrap();
    annotate_remote(&mut report, &LevelValidator::default());

    assert_eq!(report.validation_errors, 2);
    assert!(report.entry(a.id).unwrap().validation.messages[0].contains("unique"));
}

#[test]
fn entries_without_live_remote_row_are_valid() {
    let kept = make_row("Guard", 0);
    let mut gone = make_row("Ghost", 0);
    let base = vec![kept.clone(), gone.clone()];
    gone.deleted = true;

    let mut report = compare(&base, &base, &[gone.clone()]).unwrap();
    let validator = LevelValidator::default();
    annotate_remote(&mut report, &validator);

    assert_eq!(validator.calls.get(), 0);
    assert_eq!(report.validation_errors, 0);
    assert_eq!(
        report.entry(kept.id).unwrap().validation.level,
        ValidityLevel::Valid
    );
}

#[test]
fn validate_all_without_cache_skips_deleted_rows() {
    let mut gone = make_row("", 0);
    gone.deleted = true;
    let rows = vec![make_row("Guard", 3), gone];

    let report = LevelValidator::default().validate_all(&rows);
    assert_eq!(report.rows_validated, 1);
    assert_eq!(report.rows_skipped, 1);
    assert!(report.issues.is_empty());
}
