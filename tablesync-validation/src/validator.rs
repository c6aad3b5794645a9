use crate::{ValidationIssue, ValidationReport};
use tablesync_merge::SyncRow;

/// Validation rules for one row type.
///
/// Most tables only need [`RowValidator::validate_row`]. Rules that look at
/// groups of rows rather than a single row (e.g. "every quest needs a
/// success state") go in [`RowValidator::validate_table`].
pub trait RowValidator<R: SyncRow> {
    /// Checks one row. `all_rows` is the table the row belongs to and is
    /// used for cross-row rules such as uniqueness.
    fn validate_row(&self, row: &R, all_rows: &[R]) -> Vec<ValidationIssue>;

    /// Checks rules that span several rows. Soft-deleted rows are included
    /// in `rows`; implementations skip them as needed.
    fn validate_table(&self, rows: &[R]) -> Vec<ValidationIssue> {
        let _ = rows;
        Vec::new()
    }

    /// Validates every live row plus the table-level rules, without caching.
    fn validate_all(&self, rows: &[R]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for row in rows {
            if row.is_deleted() {
                report.rows_skipped += 1;
                continue;
            }
            report.issues.extend(self.validate_row(row, rows));
            report.rows_validated += 1;
        }
        report.issues.extend(self.validate_table(rows));
        report
    }
}
