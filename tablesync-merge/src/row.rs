use serde::{Deserialize, Serialize};
use std::fmt;
use tablesync_types::{ContentHash, RowId, RowStatus};

/// A table row the sync engine can reconcile.
///
/// The engine treats rows as opaque apart from these accessors. Concrete
/// row types (NPC, quest, …) implement this once and get the whole
/// compare/resolve/apply cycle.
pub trait SyncRow: Clone {
    /// Stable identity, preserved across edits, export and import.
    fn row_id(&self) -> RowId;

    /// Replaces the identity. Only used when a "keep both" merge splits a row.
    fn set_row_id(&mut self, id: RowId);

    /// Hash over every user-editable field, including the soft-delete flag.
    ///
    /// Must exclude the identity and any status or cache fields, and must be
    /// a pure function of the row's own fields.
    fn content_hash(&self) -> ContentHash;

    /// Soft-delete flag.
    fn is_deleted(&self) -> bool;

    /// Human-readable label used for ordering and reporting.
    fn display_name(&self) -> String {
        self.row_id().to_string()
    }

    /// Records the outcome of a merge on the row.
    fn mark(&mut self, status: RowStatus) {
        let _ = status;
    }

    /// Called on every copy produced by a "keep both" merge, with the side
    /// the copy came from. Rows with a unique name column use this to keep
    /// the two copies apart.
    fn disambiguate(&mut self, side: SyncSide) {
        let _ = side;
    }
}

/// One of the three row collections taking part in a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncSide {
    Base,
    Local,
    Remote,
}

impl SyncSide {
    /// Lowercase label, also used as a name suffix.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for SyncSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
