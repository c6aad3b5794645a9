//! Row validation for tablesync tables.
//!
//! Validation rules are pluggable per table through [`RowValidator`]; this
//! crate provides the machinery around them:
//! - [`ValidationIssue`] / [`ValidationReport`]: findings as data, never errors
//! - [`StalenessCache`]: skips re-validating rows whose editable fields and
//!   rule version are unchanged since the last run
//! - [`annotate_remote`]: attaches findings on reimported rows to a sync report
//! - [`GenerationTracker`]: "assets out of date" tracking over a whole table

mod annotate;
mod cache;
mod error;
mod generation;
mod issue;
mod validator;

pub use annotate::annotate_remote;
pub use cache::{CacheStats, StalenessCache, Validatable, ValidationCache, ValidationState};
pub use error::{ValidationError, ValidationResult};
pub use generation::{GenerationTracker, table_hash};
pub use issue::{Severity, ValidationIssue, ValidationReport};
pub use validator::RowValidator;
