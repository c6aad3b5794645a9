//! Shared test helpers for validation tests.

#![allow(dead_code)]

use std::cell::Cell;
use tablesync_merge::SyncRow;
use tablesync_types::{ContentHash, ContentHasher, RowId};
use tablesync_validation::{RowValidator, Validatable, ValidationCache, ValidationIssue};

#[derive(Debug, Clone, PartialEq)]
pub struct TestRow {
    pub id: RowId,
    pub name: String,
    pub level: i32,
    pub deleted: bool,
    pub validation: ValidationCache,
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
            .field(&self.level)
            .field(&self.deleted)
            .finish()
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Validatable for TestRow {
    fn validation(&self) -> &ValidationCache {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationCache {
        &mut self.validation
    }
}

pub fn make_row(name: &str, level: i32) -> TestRow {
    TestRow {
        id: RowId::new(),
        name: name.to_string(),
        level,
        deleted: false,
        validation: ValidationCache::default(),
    }
}

/// Name required and unique among live rows; level below 1 is an error,
/// above 50 a warning. Counts how many rows it was asked to check.
#[derive(Debug, Default)]
pub struct LevelValidator {
    pub calls: Cell<usize>,
}

impl RowValidator<TestRow> for LevelValidator {
    fn validate_row(&self, row: &TestRow, all_rows: &[TestRow]) -> Vec<ValidationIssue> {
        self.calls.set(self.calls.get() + 1);
        let mut issues = Vec::new();
        if row.name.is_empty() {
            issues.push(ValidationIssue::error("Unknown", "Name", "Name is required"));
        } else if all_rows
            .iter()
            .any(|r| r.id != row.id && !r.deleted && r.name == row.name)
        {
            issues.push(ValidationIssue::error(&row.name, "Name", "Name must be unique"));
        }
        if row.level < 1 {
            issues.push(ValidationIssue::error(
                &row.name,
                "Level",
                "Level must be at least 1",
            ));
        } else if row.level > 50 {
            issues.push(ValidationIssue::warning(
                &row.name,
                "Level",
                "Level is unusually high",
            ));
        }
        issues
    }
}
