//! Error types for the sync layer.

use crate::{SyncSide, SyncStatus};
use tablesync_types::RowId;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The same row id appears twice in one input collection.
    #[error("duplicate row id {row_id} in {collection} rows")]
    DuplicateRowId {
        collection: SyncSide,
        row_id: RowId,
    },

    /// No entry exists for the given row id.
    #[error("row not found: {0}")]
    RowNotFound(RowId),

    /// A merge was requested while entries still need a decision.
    #[error("{count} entries still need a resolution (first: {first} is {status})")]
    UnresolvedEntries {
        count: usize,
        first: RowId,
        status: SyncStatus,
    },
}
