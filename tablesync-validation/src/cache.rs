//! Validation staleness cache.
//!
//! Each row carries the outcome of its last validation together with the
//! hash of the inputs that produced it: the row's editable fields combined
//! with the rule [`VersionToken`]. Re-validation is skipped while that input
//! hash still matches, so editing one cell only re-checks one row, while a
//! token bump re-checks everything.

use crate::{RowValidator, ValidationError, ValidationIssue, ValidationReport, ValidationResult};
use serde::{Deserialize, Serialize};
use tablesync_merge::SyncRow;
use tablesync_types::{ContentHash, RowId, VersionToken};
use tracing::{debug, trace};

/// Outcome of the last validation run on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Never validated, or invalidated since.
    #[default]
    Unknown,
    /// No error-severity issues (warnings allowed).
    Valid,
    /// At least one error-severity issue.
    Invalid,
}

/// Cached validation result stored on a row.
///
/// Not part of the row's content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationCache {
    pub state: ValidationState,
    /// Input hash the cached result was computed from.
    pub input_hash: Option<ContentHash>,
    /// Issue messages joined with `"; "`.
    pub summary: String,
    pub issue_count: usize,
}

impl ValidationCache {
    /// Forces the next validation to run.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Returns true if this cache answers for `input_hash`.
    pub fn is_fresh(&self, input_hash: ContentHash) -> bool {
        self.state != ValidationState::Unknown && self.input_hash == Some(input_hash)
    }

    fn store(&mut self, input_hash: ContentHash, issues: &[ValidationIssue]) {
        self.state = if issues.iter().any(ValidationIssue::is_error) {
            ValidationState::Invalid
        } else {
            ValidationState::Valid
        };
        self.input_hash = Some(input_hash);
        self.issue_count = issues.len();
        self.summary = issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
    }
}

/// A row that carries a [`ValidationCache`].
pub trait Validatable: SyncRow {
    fn validation(&self) -> &ValidationCache;
    fn validation_mut(&mut self) -> &mut ValidationCache;
}

/// Hit/miss counters for a [`StalenessCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Runs a validator only on rows whose cached result is stale.
#[derive(Debug, Clone, Default)]
pub struct StalenessCache<V> {
    validator: V,
    stats: CacheStats,
}

impl<V> StalenessCache<V> {
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            stats: CacheStats::default(),
        }
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}

/// Hash of everything a row's validation result depends on.
pub(crate) fn input_hash<R: SyncRow>(row: &R, version: &VersionToken) -> ContentHash {
    row.content_hash().combine_token(version)
}

impl<V> StalenessCache<V> {
    /// Validates `row` unless its cached result is still fresh.
    ///
    /// Returns the issues found, or an empty list on a cache hit (the cached
    /// state, summary and count on the row stay authoritative).
    pub fn validate_and_cache<R>(
        &mut self,
        row: &mut R,
        all_rows: &[R],
        version: &VersionToken,
    ) -> Vec<ValidationIssue>
    where
        R: Validatable,
        V: RowValidator<R>,
    {
        match self.evaluate(row, all_rows, version) {
            Some((hash, issues)) => {
                row.validation_mut().store(hash, &issues);
                issues
            }
            None => Vec::new(),
        }
    }

    /// Re-validates the row with `row_id` in place, checking it against the
    /// rest of `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RowNotFound`] if no row has `row_id`.
    pub fn validate_row_by_id<R>(
        &mut self,
        rows: &mut [R],
        row_id: RowId,
        version: &VersionToken,
    ) -> ValidationResult<Vec<ValidationIssue>>
    where
        R: Validatable,
        V: RowValidator<R>,
    {
        let index = rows
            .iter()
            .position(|r| r.row_id() == row_id)
            .ok_or(ValidationError::RowNotFound(row_id))?;
        Ok(self.validate_at(rows, index, version).unwrap_or_default())
    }

    /// Validates every live row, reusing fresh cached results, then runs
    /// the table-level rules.
    ///
    /// Soft-deleted rows are skipped and keep whatever cache they had.
    pub fn validate_all_and_cache<R>(
        &mut self,
        rows: &mut [R],
        version: &VersionToken,
    ) -> ValidationReport
    where
        R: Validatable,
        V: RowValidator<R>,
    {
        let mut report = ValidationReport::default();
        for index in 0..rows.len() {
            if rows[index].is_deleted() {
                report.rows_skipped += 1;
                continue;
            }
            match self.validate_at(rows, index, version) {
                Some(issues) => {
                    report.rows_validated += 1;
                    report.issues.extend(issues);
                }
                None => report.rows_cached += 1,
            }
        }
        report.issues.extend(self.validator.validate_table(rows));

        debug!(
            "Validated {} rows ({} cached, {} deleted): {} errors, {} warnings",
            report.rows_validated,
            report.rows_cached,
            report.rows_skipped,
            report.error_count(),
            report.warning_count()
        );
        report
    }

    /// `None` on a cache hit.
    fn validate_at<R>(
        &mut self,
        rows: &mut [R],
        index: usize,
        version: &VersionToken,
    ) -> Option<Vec<ValidationIssue>>
    where
        R: Validatable,
        V: RowValidator<R>,
    {
        let (hash, issues) = self.evaluate(&rows[index], rows, version)?;
        rows[index].validation_mut().store(hash, &issues);
        Some(issues)
    }

    fn evaluate<R>(
        &mut self,
        row: &R,
        all_rows: &[R],
        version: &VersionToken,
    ) -> Option<(ContentHash, Vec<ValidationIssue>)>
    where
        R: Validatable,
        V: RowValidator<R>,
    {
        let hash = input_hash(row, version);
        if row.validation().is_fresh(hash) {
            trace!("Validation cache hit for row {}", row.row_id());
            self.stats.hits += 1;
            return None;
        }
        self.stats.misses += 1;
        Some((hash, self.validator.validate_row(row, all_rows)))
    }
}
