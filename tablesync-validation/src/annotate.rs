use crate::{RowValidator, Severity};
use tablesync_merge::{EntryValidation, SyncReport, SyncRow, ValidityLevel};
use tracing::info;

/// Validates every entry's Remote row and records the findings on the entry.
///
/// Remote rows are checked against the other Remote rows, since that is the
/// table the reimported copy will become if accepted. Entries without a
/// Remote row, or whose Remote row is soft-deleted, are reset to valid.
/// Returns the number of entries with at least one error.
pub fn annotate_remote<R, V>(report: &mut SyncReport<R>, validator: &V) -> usize
where
    R: SyncRow,
    V: RowValidator<R> + ?Sized,
{
    let remote_rows: Vec<R> = report
        .entries
        .iter()
        .filter_map(|e| e.remote.clone())
        .collect();

    let mut errors = 0;
    let mut warnings = 0;
    for entry in &mut report.entries {
        entry.validation = match entry.remote.as_ref().filter(|r| !r.is_deleted()) {
            Some(remote) => {
                let issues = validator.validate_row(remote, &remote_rows);
                let level = match issues.iter().map(|i| i.severity).max() {
                    Some(Severity::Error) => ValidityLevel::Error,
                    Some(Severity::Warning) => ValidityLevel::Warning,
                    None => ValidityLevel::Valid,
                };
                EntryValidation {
                    level,
                    messages: issues.iter().map(ToString::to_string).collect(),
                }
            }
            None => EntryValidation::default(),
        };
        match entry.validation.level {
            ValidityLevel::Error => errors += 1,
            ValidityLevel::Warning => warnings += 1,
            ValidityLevel::Valid => {}
        }
    }

    report.validation_errors = errors;
    report.validation_warnings = warnings;
    info!(
        "Remote validation: {} rows with errors, {} with warnings",
        errors, warnings
    );
    errors
}
