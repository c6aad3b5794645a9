use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Can generate, but the result may misbehave.
    Warning,
    /// Must be fixed before generation.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("WARNING"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// One finding on one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Human label of the offending row (e.g. the NPC name).
    pub row_label: String,
    /// Offending column, if the finding is about a single field.
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    /// Creates an error-severity issue on `field`.
    pub fn error(row_label: impl Into<String>, field: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, row_label, Some(field), message)
    }

    /// Creates a warning-severity issue on `field`.
    pub fn warning(row_label: impl Into<String>, field: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, row_label, Some(field), message)
    }

    pub fn new(
        severity: Severity,
        row_label: impl Into<String>,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            row_label: row_label.into(),
            field: field.filter(|f| !f.is_empty()).map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "[{}] {}.{}: {}",
                self.severity, self.row_label, field, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.row_label, self.message),
        }
    }
}

/// Issues collected over a whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Rows whose validation actually ran.
    pub rows_validated: usize,
    /// Rows answered from the staleness cache.
    pub rows_cached: usize,
    /// Soft-deleted rows that were not checked.
    pub rows_skipped: usize,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}
