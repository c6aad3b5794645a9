//! Three-way sync and merge engine for tablesync.
//!
//! Reconciles table rows that live in three places:
//! - **Base**: the snapshot taken at the last successful export
//! - **Local**: the current state held by the authoring tool
//! - **Remote**: the state reimported from an externally edited copy
//!
//! # Architecture
//!
//! The engine is generic over any row type implementing [`SyncRow`]; it only
//! needs a stable identity, a content hash and a soft-delete flag.
//!
//! ## Components
//!
//! - **Comparator**: classifies every row identity into one of nine [`SyncStatus`]es
//! - **Resolver**: records and checks the user's [`Resolution`] per entry
//! - **Applicator**: turns a fully resolved report into the merged row set
//! - **Engine**: ties the three together under a [`SyncConfig`]
//!
//! ## Sync Process
//!
//! 1. **Compare**: build a [`SyncReport`] from Base/Local/Remote
//! 2. **Auto-resolve**: settle entries that need no review
//! 3. **Review**: the host lets a user resolve the remaining entries
//! 4. **Apply**: produce a [`MergeResult`] for the host to persist
//!
//! The whole cycle works on a snapshot; nothing is persisted until the host
//! stores the merge result, so abandoning a sync is just dropping the report.
//!
//! # Example
//!
//! ```
//! use tablesync_merge::{SyncConfig, SyncEngine, SyncRow};
//! use tablesync_types::{ContentHash, RowId};
//!
//! #[derive(Clone)]
//! struct Row { id: RowId, name: String, deleted: bool }
//!
//! impl SyncRow for Row {
//!     fn row_id(&self) -> RowId { self.id }
//!     fn set_row_id(&mut self, id: RowId) { self.id = id; }
//!     fn content_hash(&self) -> ContentHash { ContentHash::of(&self.name) }
//!     fn is_deleted(&self) -> bool { self.deleted }
//! }
//!
//! let row = Row { id: RowId::new(), name: "Guard".into(), deleted: false };
//! let rows = vec![row];
//!
//! let engine = SyncEngine::new(SyncConfig::default());
//! let mut report = engine.compare(&rows, &rows, &rows).unwrap();
//! engine.auto_resolve(&mut report);
//! assert!(engine.all_resolved(&report));
//!
//! let merged = engine.apply(&report);
//! assert_eq!(merged.merged_rows.len(), 1);
//! assert_eq!(merged.unchanged, 1);
//! ```

pub mod applicator;
pub mod comparator;
mod engine;
mod error;
pub mod report;
pub mod resolver;
mod row;

pub use applicator::{apply_merge, try_apply_merge, MergeApplier, MergeResult};
pub use comparator::{classify, compare};
pub use engine::{SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use report::{
    EntryValidation, Resolution, StatusCounts, SyncEntry, SyncReport, SyncStatus, ValidityLevel,
};
pub use resolver::{
    all_resolved, auto_resolve_non_conflicts, pending, requires_resolution, resolve,
    resolve_where, ReviewPolicy,
};
pub use row::{SyncRow, SyncSide};
