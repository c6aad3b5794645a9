//! Core type definitions for tablesync.
//!
//! This crate defines the fundamental, table-agnostic types used by the
//! sync engine and the validation cache:
//! - Row identifiers (UUID v7) and rule-version tokens
//! - Deterministic content hashing over a row's editable fields
//! - The per-row authoring status recorded after a merge
//!
//! Concrete table rows (NPCs, quest states, …) live in `tablesync-tables`,
//! not here.

mod hash;
mod ids;
mod status;

pub use hash::{ContentHash, ContentHasher, HashField};
pub use ids::{RowId, VersionToken};
pub use status::RowStatus;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
}
