//! Tracks whether generated assets still match the authored table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablesync_merge::SyncRow;
use tablesync_types::ContentHash;
use tracing::{info, warn};

/// Folds every row's content hash, in table order.
pub fn table_hash<R: SyncRow>(rows: &[R]) -> ContentHash {
    rows.iter()
        .fold(ContentHash::default(), |acc, row| acc.combine(row.content_hash()))
}

/// Generation bookkeeping persisted alongside a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTracker {
    /// Table hash at the last fully successful generation.
    pub last_generated_hash: Option<ContentHash>,
    /// When generation was last attempted.
    pub last_generated_at: Option<DateTime<Utc>>,
    /// Failures in the last attempt (0 = full success).
    pub last_failure_count: usize,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the table changed since the last successful
    /// generation, or if there never was one.
    pub fn is_out_of_date<R: SyncRow>(&self, rows: &[R]) -> bool {
        self.last_generated_hash != Some(table_hash(rows))
    }

    /// Records a generation attempt. The table hash is only stored when
    /// nothing failed, so a partial run keeps the table out of date.
    pub fn on_generation_complete<R: SyncRow>(&mut self, rows: &[R], failure_count: usize) {
        self.last_generated_at = Some(Utc::now());
        self.last_failure_count = failure_count;
        if failure_count == 0 {
            let hash = table_hash(rows);
            info!("Generation complete for {} rows (hash {})", rows.len(), hash);
            self.last_generated_hash = Some(hash);
        } else {
            warn!("Generation finished with {} failures", failure_count);
        }
    }
}
