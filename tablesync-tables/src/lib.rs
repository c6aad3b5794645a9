//! Concrete tables for tablesync.
//!
//! Instantiates the generic sync engine and validation cache for the
//! authored tables:
//! - [`NpcRow`]: NPC definitions, validated by [`NpcValidator`]
//! - [`QuestRow`]: quest states, validated by [`QuestValidator`]
//! - [`ItemRow`]: item definitions, validated by [`ItemValidator`]
//! - [`DialogueRow`]: dialogue tree nodes, validated by [`DialogueValidator`]
//!
//! [`Table`] holds a table's rows with its rule version and generation
//! bookkeeping.

mod dialogue;
mod item;
mod npc;
mod quest;
mod table;
pub mod tags;

pub use dialogue::{dialogue_ids, DialogueNodeType, DialogueRow, DialogueValidator};
pub use item::{ItemRow, ItemType, ItemValidator};
pub use npc::{NpcRow, NpcValidator};
pub use quest::{QuestRow, QuestStateType, QuestValidator};
pub use table::{Table, TableRow};

/// Parses a JSON snapshot (an array of rows).
pub fn rows_from_json<R: serde::de::DeserializeOwned>(json: &str) -> serde_json::Result<Vec<R>> {
    serde_json::from_str(json)
}

/// Writes rows as a pretty-printed JSON snapshot.
pub fn rows_to_json<R: serde::Serialize>(rows: &[R]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}
