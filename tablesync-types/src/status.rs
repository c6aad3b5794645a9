use serde::{Deserialize, Serialize};
use std::fmt;

/// Authoring status of a row, recorded when a merge produces it.
///
/// This is bookkeeping for the host (e.g. which rows need regeneration);
/// it is never part of a row's content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Created since the last sync.
    #[default]
    New,
    /// Edited since the last sync.
    Modified,
    /// Identical to the last exported state.
    Synced,
    /// Last generation from this row failed.
    Error,
}

impl RowStatus {
    /// Returns true if the host should push this row to its assets.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self, Self::New | Self::Modified)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "New",
            Self::Modified => "Modified",
            Self::Synced => "Synced",
            Self::Error => "Error",
        };
        f.write_str(label)
    }
}
