//! Comparison output: per-row sync entries and summary counts.

use crate::resolver::{self, ReviewPolicy};
use crate::SyncRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use tablesync_types::{ContentHash, RowId};

/// Outcome of the three-way comparison for one row identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Base, Local and Remote agree (or both sides made the same change).
    Unchanged,
    /// Only Local changed since Base.
    ModifiedInLocal,
    /// Only Remote changed since Base.
    ModifiedInRemote,
    /// Both sides changed, differently.
    Conflict,
    /// New row that only Local has.
    AddedInLocal,
    /// New row that only Remote has.
    AddedInRemote,
    /// Local dropped (or soft-deleted) a row Remote still has.
    DeletedInLocal,
    /// Remote dropped (or soft-deleted) a row Local still has.
    DeletedInRemote,
    /// A deletion that the two sides do not agree on.
    DeleteConflict,
}

impl SyncStatus {
    /// Every status, in reporting order.
    pub const ALL: [SyncStatus; 9] = [
        Self::Unchanged,
        Self::ModifiedInLocal,
        Self::ModifiedInRemote,
        Self::Conflict,
        Self::AddedInLocal,
        Self::AddedInRemote,
        Self::DeletedInLocal,
        Self::DeletedInRemote,
        Self::DeleteConflict,
    ];

    /// Short label for status columns.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::ModifiedInLocal => "modified in local",
            Self::ModifiedInRemote => "modified in remote",
            Self::Conflict => "conflict",
            Self::AddedInLocal => "added in local",
            Self::AddedInRemote => "added in remote",
            Self::DeletedInLocal => "deleted in local",
            Self::DeletedInRemote => "deleted in remote",
            Self::DeleteConflict => "delete conflict",
        }
    }

    /// True for the two statuses where the sides genuinely disagree.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict | Self::DeleteConflict)
    }

    /// True for the two one-sided deletions.
    #[must_use]
    pub const fn is_deletion(&self) -> bool {
        matches!(self, Self::DeletedInLocal | Self::DeletedInRemote)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The user's decision for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Unresolved,
    KeepLocal,
    KeepRemote,
    /// Keep both versions as two new rows with fresh identities.
    KeepBoth,
    Delete,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unresolved => "unresolved",
            Self::KeepLocal => "keep local",
            Self::KeepRemote => "keep remote",
            Self::KeepBoth => "keep both",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Worst validation severity found on an entry's Remote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityLevel {
    #[default]
    Valid,
    Warning,
    Error,
}

/// Validation findings attached to an entry for review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryValidation {
    pub level: ValidityLevel,
    pub messages: Vec<String>,
}

/// One row identity with its three versions and the pending decision.
#[derive(Debug, Clone)]
pub struct SyncEntry<R> {
    pub row_id: RowId,
    pub status: SyncStatus,
    pub resolution: Resolution,
    pub base: Option<R>,
    pub local: Option<R>,
    pub remote: Option<R>,
    /// `None` when the row is absent from that collection.
    pub base_hash: Option<ContentHash>,
    pub local_hash: Option<ContentHash>,
    pub remote_hash: Option<ContentHash>,
    pub validation: EntryValidation,
}

impl<R: SyncRow> SyncEntry<R> {
    /// Label taken from the Local version, else Remote, else Base.
    pub fn display_name(&self) -> String {
        self.local
            .as_ref()
            .or(self.remote.as_ref())
            .or(self.base.as_ref())
            .map(SyncRow::display_name)
            .unwrap_or_else(|| self.row_id.to_string())
    }
}

impl<R> SyncEntry<R> {
    /// Whether this entry needs an explicit decision under `policy`.
    pub fn requires_resolution(&self, policy: ReviewPolicy) -> bool {
        resolver::requires_resolution(self, policy)
    }

    /// Whether this entry is ready for the merge under `policy`.
    pub fn is_settled(&self, policy: ReviewPolicy) -> bool {
        !self.requires_resolution(policy) || self.resolution != Resolution::Unresolved
    }
}

/// Number of entries per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub unchanged: usize,
    pub modified_in_local: usize,
    pub modified_in_remote: usize,
    pub conflict: usize,
    pub added_in_local: usize,
    pub added_in_remote: usize,
    pub deleted_in_local: usize,
    pub deleted_in_remote: usize,
    pub delete_conflict: usize,
}

impl StatusCounts {
    /// Counts one entry.
    pub fn record(&mut self, status: SyncStatus) {
        *self.slot(status) += 1;
    }

    /// Number of entries with `status`.
    #[must_use]
    pub fn get(&self, status: SyncStatus) -> usize {
        match status {
            SyncStatus::Unchanged => self.unchanged,
            SyncStatus::ModifiedInLocal => self.modified_in_local,
            SyncStatus::ModifiedInRemote => self.modified_in_remote,
            SyncStatus::Conflict => self.conflict,
            SyncStatus::AddedInLocal => self.added_in_local,
            SyncStatus::AddedInRemote => self.added_in_remote,
            SyncStatus::DeletedInLocal => self.deleted_in_local,
            SyncStatus::DeletedInRemote => self.deleted_in_remote,
            SyncStatus::DeleteConflict => self.delete_conflict,
        }
    }

    fn slot(&mut self, status: SyncStatus) -> &mut usize {
        match status {
            SyncStatus::Unchanged => &mut self.unchanged,
            SyncStatus::ModifiedInLocal => &mut self.modified_in_local,
            SyncStatus::ModifiedInRemote => &mut self.modified_in_remote,
            SyncStatus::Conflict => &mut self.conflict,
            SyncStatus::AddedInLocal => &mut self.added_in_local,
            SyncStatus::AddedInRemote => &mut self.added_in_remote,
            SyncStatus::DeletedInLocal => &mut self.deleted_in_local,
            SyncStatus::DeletedInRemote => &mut self.deleted_in_remote,
            SyncStatus::DeleteConflict => &mut self.delete_conflict,
        }
    }

    /// Total number of entries.
    #[must_use]
    pub fn total(&self) -> usize {
        SyncStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Conflicts of either kind.
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.conflict + self.delete_conflict
    }

    /// One-sided deletions.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.deleted_in_local + self.deleted_in_remote
    }

    /// Everything except unchanged rows.
    #[must_use]
    pub fn changes(&self) -> usize {
        self.total() - self.unchanged
    }
}

/// Result of comparing Base, Local and Remote.
#[derive(Debug, Clone)]
pub struct SyncReport<R> {
    pub entries: Vec<SyncEntry<R>>,
    pub counts: StatusCounts,
    /// Remote rows with error-severity validation issues.
    pub validation_errors: usize,
    /// Remote rows with warning-severity validation issues.
    pub validation_warnings: usize,
}

impl<R> SyncReport<R> {
    /// Builds a report and tallies its statuses.
    pub fn new(entries: Vec<SyncEntry<R>>) -> Self {
        let mut counts = StatusCounts::default();
        for entry in &entries {
            counts.record(entry.status);
        }
        Self {
            entries,
            counts,
            validation_errors: 0,
            validation_warnings: 0,
        }
    }

    /// Returns true if any entry is a conflict of either kind.
    pub fn has_conflicts(&self) -> bool {
        self.counts.conflicts() > 0
    }

    /// Returns true if applying the merge would change anything.
    pub fn has_changes(&self) -> bool {
        self.counts.changes() > 0
    }

    /// Number of non-unchanged entries.
    pub fn total_changes(&self) -> usize {
        self.counts.changes()
    }

    /// Returns true if any Remote row failed validation.
    pub fn has_validation_errors(&self) -> bool {
        self.validation_errors > 0
    }

    /// Looks up an entry by row id.
    pub fn entry(&self, row_id: RowId) -> Option<&SyncEntry<R>> {
        self.entries.iter().find(|e| e.row_id == row_id)
    }

    /// Looks up an entry by row id, mutably.
    pub fn entry_mut(&mut self, row_id: RowId) -> Option<&mut SyncEntry<R>> {
        self.entries.iter_mut().find(|e| e.row_id == row_id)
    }

    /// Entries of either conflict kind.
    pub fn conflicts(&self) -> impl Iterator<Item = &SyncEntry<R>> {
        self.entries.iter().filter(|e| e.status.is_conflict())
    }

    /// Entries that need an explicit decision under `policy`.
    pub fn requiring_resolution(
        &self,
        policy: ReviewPolicy,
    ) -> impl Iterator<Item = &SyncEntry<R>> {
        self.entries
            .iter()
            .filter(move |e| e.requires_resolution(policy))
    }

    /// One-line summary such as `"3 unchanged, 1 conflict"`.
    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = SyncStatus::ALL
            .iter()
            .filter_map(|status| {
                let n = self.counts.get(*status);
                (n > 0).then(|| {
                    let label = status.label();
                    if n > 1 && status.is_conflict() {
                        format!("{n} {label}s")
                    } else {
                        format!("{n} {label}")
                    }
                })
            })
            .collect();

        if parts.is_empty() {
            "no rows".to_string()
        } else {
            parts.join(", ")
        }
    }
}
