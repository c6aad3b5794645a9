//! Shared test helpers for sync tests.

#![allow(dead_code)]

use tablesync_merge::{SyncRow, SyncSide};
use tablesync_types::{ContentHash, ContentHasher, RowId, RowStatus};

/// Minimal row: a unique name, one editable value and a soft-delete flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRow {
    pub id: RowId,
    pub name: String,
    pub value: i64,
    pub deleted: bool,
    pub status: RowStatus,
}

impl SyncRow for TestRow {
    fn row_id(&self) -> RowId {
        self.id
    }

    fn set_row_id(&mut self, id: RowId) {
        self.id = id;
    }

    fn content_hash(&self) -> ContentHash {
        ContentHasher::new()
            .field(&self.name)
            .field(&self.value)
            .field(&self.deleted)
            .finish()
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn mark(&mut self, status: RowStatus) {
        self.status = status;
    }

    fn disambiguate(&mut self, side: SyncSide) {
        if side == SyncSide::Remote {
            self.name.push_str("_remote");
        }
    }
}

pub fn make_row(name: &str, value: i64) -> TestRow {
    TestRow {
        id: RowId::new(),
        name: name.to_string(),
        value,
        deleted: false,
        status: RowStatus::New,
    }
}

/// Same identity as `row`, different editable value.
pub fn edited(row: &TestRow, value: i64) -> TestRow {
    TestRow {
        value,
        ..row.clone()
    }
}

/// Same identity as `row`, soft-deleted.
pub fn tombstoned(row: &TestRow) -> TestRow {
    TestRow {
        deleted: true,
        ..row.clone()
    }
}

/// Same identity as `row`, with only the merge status changed.
pub fn restamped(row: &TestRow, status: RowStatus) -> TestRow {
    TestRow {
        status,
        ..row.clone()
    }
}
