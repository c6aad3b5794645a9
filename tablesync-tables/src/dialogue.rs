//! Dialogue node table. Rows sharing a `dialogue_id` form one dialogue tree,
//! linked through `parent_node_id` and `next_node_ids`.

use crate::table::TableRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tablesync_merge::{SyncRow, SyncSide};
use tablesync_types::{ContentHash, ContentHasher, RowId, RowStatus};
use tablesync_validation::{
    RowValidator, Severity, Validatable, ValidationCache, ValidationIssue,
};

/// Who speaks a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueNodeType {
    #[default]
    Npc,
    Player,
}

impl DialogueNodeType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Npc => "NPC",
            Self::Player => "Player",
        }
    }

    const fn code(&self) -> u8 {
        match self {
            Self::Npc => 0,
            Self::Player => 1,
        }
    }
}

impl fmt::Display for DialogueNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dialogue node.
///
/// `option_text` is the choice shown for a player node; `text` is what is
/// actually said. `events` and `conditions` are `;`-separated token strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueRow {
    pub row_id: RowId,
    pub dialogue_id: String,
    pub node_id: String,
    pub node_type: DialogueNodeType,
    pub speaker: String,
    pub text: String,
    pub option_text: String,
    pub parent_node_id: String,
    pub next_node_ids: Vec<String>,
    pub skippable: bool,
    pub events: String,
    pub conditions: String,
    pub notes: String,
    pub deleted: bool,

    pub status: RowStatus,
    pub validation: ValidationCache,
}

impl Default for DialogueRow {
    fn default() -> Self {
        Self {
            row_id: RowId::new(),
            dialogue_id: String::new(),
            node_id: String::new(),
            node_type: DialogueNodeType::Npc,
            speaker: String::new(),
            text: String::new(),
            option_text: String::new(),
            parent_node_id: String::new(),
            next_node_ids: Vec::new(),
            skippable: false,
            events: String::new(),
            conditions: String::new(),
            notes: String::new(),
            deleted: false,
            status: RowStatus::New,
            validation: ValidationCache::default(),
        }
    }
}

impl DialogueRow {
    pub fn new(
        dialogue_id: impl Into<String>,
        node_id: impl Into<String>,
        node_type: DialogueNodeType,
    ) -> Self {
        Self {
            dialogue_id: dialogue_id.into(),
            node_id: node_id.into(),
            node_type,
            ..Self::default()
        }
    }

    /// Returns true if the row has its ids and the text its node type needs.
    pub fn is_valid(&self) -> bool {
        if self.dialogue_id.is_empty() || self.node_id.is_empty() {
            return false;
        }
        match self.node_type {
            DialogueNodeType::Npc => !self.text.is_empty(),
            DialogueNodeType::Player => !self.option_text.is_empty(),
        }
    }

    /// Non-empty successor ids.
    fn next_ids(&self) -> impl Iterator<Item = &str> {
        self.next_node_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    fn label(&self) -> String {
        let dialogue = if self.dialogue_id.is_empty() {
            "Unknown"
        } else {
            self.dialogue_id.as_str()
        };
        let node = if self.node_id.is_empty() {
            "Unknown"
        } else {
            self.node_id.as_str()
        };
        format!("{dialogue}/{node}")
    }
}

/// Distinct dialogue ids in first-seen order, ignoring deleted rows.
pub fn dialogue_ids(rows: &[DialogueRow]) -> Vec<&str> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| !r.deleted && !r.dialogue_id.is_empty())
        .map(|r| r.dialogue_id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

impl SyncRow for DialogueRow {
    fn row_id(&self) -> RowId {
        self.row_id
    }

    fn set_row_id(&mut self, id: RowId) {
        self.row_id = id;
    }

    fn content_hash(&self) -> ContentHash {
        ContentHasher::new()
            .field(&self.dialogue_id)
            .field(&self.node_id)
            .field(&self.speaker)
            .field(&self.parent_node_id)
            .field(&self.node_type.code())
            .field(&self.text)
            .field(&self.option_text)
            .field(&self.notes)
            .field(&self.skippable)
            .field(&self.events)
            .field(&self.conditions)
            .field(&self.next_node_ids)
            .field(&self.deleted)
            .finish()
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn display_name(&self) -> String {
        self.label()
    }

    fn mark(&mut self, status: RowStatus) {
        self.status = status;
    }

    fn disambiguate(&mut self, side: SyncSide) {
        if side == SyncSide::Remote {
            self.node_id.push_str("_Remote");
        }
    }
}

impl Validatable for DialogueRow {
    fn validation(&self) -> &ValidationCache {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationCache {
        &mut self.validation
    }
}

impl TableRow for DialogueRow {
    const DEFAULT_OUTPUT_FOLDER: &'static str = "/Game/Dialogues";

    fn duplicate(&self) -> Self {
        Self {
            row_id: RowId::new(),
            node_id: format!("{}_Copy", self.node_id),
            status: RowStatus::New,
            validation: ValidationCache::default(),
            ..self.clone()
        }
    }
}

/// Rules for dialogue nodes, plus per-dialogue tree checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogueValidator;

impl DialogueValidator {
    fn node_exists(row: &DialogueRow, node_id: &str, all_rows: &[DialogueRow]) -> bool {
        all_rows.iter().any(|other| {
            !other.deleted && other.dialogue_id == row.dialogue_id && other.node_id == node_id
        })
    }

    fn node_id_taken(row: &DialogueRow, all_rows: &[DialogueRow]) -> bool {
        all_rows.iter().any(|other| {
            other.row_id != row.row_id
                && !other.deleted
                && other.dialogue_id == row.dialogue_id
                && other.node_id == row.node_id
        })
    }

    /// Follows `next_node_ids` from `node`; true if the walk returns to a
    /// node already on the current path.
    fn walk_finds_cycle<'a>(
        node: &'a str,
        nodes: &BTreeMap<&'a str, &'a DialogueRow>,
        path: &mut Vec<&'a str>,
    ) -> bool {
        if path.contains(&node) {
            return true;
        }
        let Some(row) = nodes.get(node) else {
            return false;
        };
        path.push(node);
        let found = row
            .next_ids()
            .any(|next| Self::walk_finds_cycle(next, nodes, path));
        path.pop();
        found
    }

    fn check_tree(dialogue: &str, rows: &[&DialogueRow], issues: &mut Vec<ValidationIssue>) {
        let nodes: BTreeMap<&str, &DialogueRow> =
            rows.iter().map(|r| (r.node_id.as_str(), *r)).collect();
        let roots: Vec<&str> = rows
            .iter()
            .filter(|r| r.parent_node_id.is_empty())
            .map(|r| r.node_id.as_str())
            .collect();

        match roots.len() {
            0 => issues.push(ValidationIssue::new(
                Severity::Error,
                dialogue,
                None,
                "Dialogue has no root node (all nodes have parents)",
            )),
            1 => {}
            _ => issues.push(ValidationIssue::new(
                Severity::Warning,
                dialogue,
                None,
                format!("Multiple root nodes found: {}", roots.join(", ")),
            )),
        }

        // Reported once per dialogue.
        if let Some(row) = rows
            .iter()
            .find(|r| Self::walk_finds_cycle(&r.node_id, &nodes, &mut Vec::new()))
        {
            issues.push(ValidationIssue::new(
                Severity::Error,
                row.label(),
                None,
                "Circular reference detected in dialogue tree",
            ));
        }

        let mut reachable: HashSet<&str> = HashSet::new();
        let mut to_visit = roots;
        while let Some(current) = to_visit.pop() {
            if !reachable.insert(current) {
                continue;
            }
            if let Some(row) = nodes.get(current) {
                to_visit.extend(row.next_ids().filter(|next| !reachable.contains(next)));
            }
        }
        for row in rows {
            if !row.parent_node_id.is_empty() && !reachable.contains(row.node_id.as_str()) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    row.label(),
                    None,
                    "Node is not reachable from any root",
                ));
            }
        }
    }
}

impl RowValidator<DialogueRow> for DialogueValidator {
    fn validate_row(&self, row: &DialogueRow, all_rows: &[DialogueRow]) -> Vec<ValidationIssue> {
        let label = row.label();
        let mut issues = Vec::new();

        if row.dialogue_id.is_empty() {
            issues.push(ValidationIssue::error(&label, "DialogueID", "DialogueID is required"));
        }
        if row.node_id.is_empty() {
            issues.push(ValidationIssue::error(&label, "NodeID", "NodeID is required"));
        }

        match row.node_type {
            DialogueNodeType::Npc => {
                if row.text.is_empty() {
                    issues.push(ValidationIssue::error(&label, "Text", "NPC nodes require Text"));
                }
                if row.speaker.is_empty() {
                    issues.push(ValidationIssue::warning(
                        &label,
                        "Speaker",
                        "NPC nodes should have a Speaker",
                    ));
                }
            }
            DialogueNodeType::Player => {
                if row.option_text.is_empty() {
                    issues.push(ValidationIssue::error(
                        &label,
                        "OptionText",
                        "Player nodes require OptionText",
                    ));
                }
                if row.text.is_empty() {
                    issues.push(ValidationIssue::warning(
                        &label,
                        "Text",
                        "Player nodes should have Text (what player says)",
                    ));
                }
            }
        }

        if !row.parent_node_id.is_empty()
            && !Self::node_exists(row, &row.parent_node_id, all_rows)
        {
            issues.push(ValidationIssue::error(
                &label,
                "ParentNodeID",
                format!("ParentNodeID '{}' not found in dialogue", row.parent_node_id),
            ));
        }
        for next in row.next_ids() {
            if !Self::node_exists(row, next, all_rows) {
                issues.push(ValidationIssue::error(
                    &label,
                    "NextNodeIDs",
                    format!("NextNodeID '{next}' not found in dialogue"),
                ));
            }
        }

        if !row.node_id.is_empty() && Self::node_id_taken(row, all_rows) {
            issues.push(ValidationIssue::error(&label, "NodeID", "Duplicate NodeID in dialogue"));
        }

        issues
    }

    fn validate_table(&self, rows: &[DialogueRow]) -> Vec<ValidationIssue> {
        let mut dialogues: BTreeMap<&str, Vec<&DialogueRow>> = BTreeMap::new();
        for row in rows.iter().filter(|r| !r.deleted && !r.dialogue_id.is_empty()) {
            dialogues.entry(row.dialogue_id.as_str()).or_default().push(row);
        }

        let mut issues = Vec::new();
        for (dialogue, nodes) in dialogues {
            Self::check_tree(dialogue, &nodes, &mut issues);
        }
        issues
    }
}
