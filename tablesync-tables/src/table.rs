//! Table container: the rows plus the bookkeeping persisted with them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablesync_merge::{MergeResult, SyncEngine, SyncReport, SyncResult, SyncRow};
use tablesync_types::{RowId, RowStatus, VersionToken};
use tablesync_validation::{
    GenerationTracker, RowValidator, StalenessCache, Validatable, ValidationReport,
};
use tracing::{debug, info};

/// A row type that can live in a [`Table`].
pub trait TableRow: Validatable + Default {
    /// Where generated assets go unless the table says otherwise.
    const DEFAULT_OUTPUT_FOLDER: &'static str;

    /// Copy of this row for "duplicate row": fresh identity, a `_Copy`
    /// suffix on the unique name column, status `New`, no cached validation.
    fn duplicate(&self) -> Self;
}

/// A whole authored table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table<R> {
    #[serde(default)]
    pub rows: Vec<R>,
    #[serde(default)]
    pub output_folder: String,
    /// When the last merge was applied.
    #[serde(default)]
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Version of the external lists the validation rules depend on.
    #[serde(default)]
    pub lists_version: VersionToken,
    #[serde(default)]
    pub generation: GenerationTracker,
}

impl<R: TableRow> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            output_folder: R::DEFAULT_OUTPUT_FOLDER.to_string(),
            last_sync_time: None,
            lists_version: VersionToken::new(),
            generation: GenerationTracker::new(),
        }
    }
}

impl<R: TableRow> Table<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing rows.
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends an empty row and returns it for editing.
    pub fn add_row(&mut self) -> &mut R {
        let mut row = R::default();
        row.set_row_id(RowId::new());
        row.mark(RowStatus::New);
        self.rows.push(row);
        let index = self.rows.len() - 1;
        &mut self.rows[index]
    }

    /// Appends a copy of the row at `index`.
    pub fn duplicate_row(&mut self, index: usize) -> Option<&mut R> {
        let copy = self.rows.get(index)?.duplicate();
        self.rows.push(copy);
        self.rows.last_mut()
    }

    pub fn remove_row(&mut self, index: usize) -> Option<R> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn find_row(&self, row_id: RowId) -> Option<&R> {
        self.rows.iter().find(|r| r.row_id() == row_id)
    }

    pub fn find_row_mut(&mut self, row_id: RowId) -> Option<&mut R> {
        self.rows.iter_mut().find(|r| r.row_id() == row_id)
    }

    pub fn row_index(&self, row_id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.row_id() == row_id)
    }

    /// Removes the row with `row_id`; returns false if there was none.
    pub fn remove_row_by_id(&mut self, row_id: RowId) -> bool {
        match self.row_index(row_id) {
            Some(index) => {
                self.rows.remove(index);
                true
            }
            None => false,
        }
    }

    /// Invalidates every cached validation result at once.
    pub fn bump_lists_version(&mut self) -> VersionToken {
        let token = self.lists_version.bump();
        debug!("Bumped lists version to {}", token);
        token
    }

    /// Validates the table, reusing fresh cached results.
    pub fn validate<V: RowValidator<R>>(&mut self, cache: &mut StalenessCache<V>) -> ValidationReport {
        cache.validate_all_and_cache(&mut self.rows, &self.lists_version)
    }

    /// Compares this table (as Local) with a Base snapshot and a Remote
    /// reimport.
    ///
    /// # Errors
    ///
    /// Returns [`tablesync_merge::SyncError::DuplicateRowId`] if any input
    /// repeats a row id.
    pub fn compare(
        &self,
        engine: &SyncEngine,
        base: &[R],
        remote: &[R],
    ) -> SyncResult<SyncReport<R>> {
        engine.compare(base, &self.rows, remote)
    }

    /// Replaces the rows with a merge result and stamps the sync time.
    pub fn apply_merge(&mut self, merged: MergeResult<R>) {
        info!(
            "Applying merge: {} rows ({} from remote, {} deleted)",
            merged.merged_rows.len(),
            merged.applied_from_remote,
            merged.deleted
        );
        self.rows = merged.merged_rows;
        self.last_sync_time = Some(Utc::now());
    }

    pub fn are_assets_out_of_date(&self) -> bool {
        self.generation.is_out_of_date(&self.rows)
    }

    pub fn on_generation_complete(&mut self, failure_count: usize) {
        self.generation
            .on_generation_complete(&self.rows, failure_count);
    }
}
