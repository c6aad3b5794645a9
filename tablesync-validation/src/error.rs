use tablesync_types::RowId;
use thiserror::Error;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised by the validation layer itself.
///
/// Rule violations are reported as [`crate::ValidationIssue`]s, not here.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("row not found: {0}")]
    RowNotFound(RowId),
}
