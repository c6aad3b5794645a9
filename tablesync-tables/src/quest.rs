//! Quest state table. Each row is one state of a quest; rows sharing a
//! `quest_name` form one quest.

use crate::table::TableRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tablesync_merge::{SyncRow, SyncSide};
use tablesync_types::{ContentHash, ContentHasher, RowId, RowStatus};
use tablesync_validation::{
    RowValidator, Severity, Validatable, ValidationCache, ValidationIssue,
};

/// Role of a state within its quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStateType {
    #[default]
    Regular,
    Success,
    Failure,
}

impl QuestStateType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }

    const fn code(&self) -> u8 {
        match self {
            Self::Regular => 0,
            Self::Success => 1,
            Self::Failure => 2,
        }
    }
}

impl fmt::Display for QuestStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One quest state.
///
/// `tasks`, `events`, `conditions` and `rewards` hold `;`-separated
/// token strings such as `BPT_FindItem(Item=Sword);BPT_Talk(NPC=Smith)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestRow {
    pub row_id: RowId,
    pub quest_name: String,
    pub display_name: String,
    pub state_id: String,
    pub state_type: QuestStateType,
    pub description: String,
    pub parent_branch: String,
    pub tasks: String,
    pub events: String,
    pub conditions: String,
    pub rewards: String,
    pub notes: String,
    pub deleted: bool,

    pub status: RowStatus,
    /// Path of the asset generated from this quest, if any.
    pub generated_quest: Option<String>,
    pub validation: ValidationCache,
}

impl Default for QuestRow {
    fn default() -> Self {
        Self {
            row_id: RowId::new(),
            quest_name: String::new(),
            display_name: String::new(),
            state_id: String::new(),
            state_type: QuestStateType::Regular,
            description: String::new(),
            parent_branch: String::new(),
            tasks: String::new(),
            events: String::new(),
            conditions: String::new(),
            rewards: String::new(),
            notes: String::new(),
            deleted: false,
            status: RowStatus::New,
            generated_quest: None,
            validation: ValidationCache::default(),
        }
    }
}

impl QuestRow {
    pub fn new(quest_name: impl Into<String>, state_id: impl Into<String>) -> Self {
        Self {
            quest_name: quest_name.into(),
            state_id: state_id.into(),
            ..Self::default()
        }
    }

    /// `Quest/State` label, with `Unknown` standing in for missing parts.
    fn label(&self) -> String {
        let quest = if self.quest_name.is_empty() {
            "Unknown"
        } else {
            self.quest_name.as_str()
        };
        let state = if self.state_id.is_empty() {
            "Unknown"
        } else {
            self.state_id.as_str()
        };
        format!("{quest}/{state}")
    }
}

impl SyncRow for QuestRow {
    fn row_id(&self) -> RowId {
        self.row_id
    }

    fn set_row_id(&mut self, id: RowId) {
        self.row_id = id;
    }

    fn content_hash(&self) -> ContentHash {
        ContentHasher::new()
            .field(&self.quest_name)
            .field(&self.display_name)
            .field(&self.state_id)
            .field(&self.state_type.code())
            .field(&self.description)
            .field(&self.parent_branch)
            .field(&self.tasks)
            .field(&self.events)
            .field(&self.conditions)
            .field(&self.rewards)
            .field(&self.notes)
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
            self.state_id.push_str("_Remote");
            self.generated_quest = None;
        }
    }
}

impl Validatable for QuestRow {
    fn validation(&self) -> &ValidationCache {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationCache {
        &mut self.validation
    }
}

impl TableRow for QuestRow {
    const DEFAULT_OUTPUT_FOLDER: &'static str = "/Game/Quests";

    fn duplicate(&self) -> Self {
        Self {
            row_id: RowId::new(),
            state_id: format!("{}_Copy", self.state_id),
            status: RowStatus::New,
            generated_quest: None,
            validation: ValidationCache::default(),
            ..self.clone()
        }
    }
}

/// Rules for quest states, plus per-quest structure checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestValidator;

/// Non-empty, trimmed `;`-separated tokens.
fn tokens(list: &str) -> impl Iterator<Item = &str> {
    list.split(';').map(str::trim).filter(|t| !t.is_empty())
}

impl QuestValidator {
    fn state_id_taken(row: &QuestRow, all_rows: &[QuestRow]) -> bool {
        all_rows.iter().any(|other| {
            other.row_id != row.row_id
                && !other.deleted
                && other.quest_name == row.quest_name
                && other.state_id == row.state_id
        })
    }

    fn parent_exists(row: &QuestRow, all_rows: &[QuestRow]) -> bool {
        all_rows.iter().any(|other| {
            !other.deleted
                && other.quest_name == row.quest_name
                && other.state_id == row.parent_branch
        })
    }

    fn check_tasks(row: &QuestRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        for task in tokens(&row.tasks) {
            if !task.starts_with("BPT_") {
                issues.push(ValidationIssue::warning(
                    label,
                    "Tasks",
                    format!("Task '{task}' should start with BPT_ prefix"),
                ));
            }
            if task.matches('(').count() != task.matches(')').count() {
                issues.push(ValidationIssue::error(
                    label,
                    "Tasks",
                    format!("Unbalanced parentheses in task '{task}'"),
                ));
            }
        }
    }

    fn check_events(row: &QuestRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        for event in tokens(&row.events) {
            if !event.starts_with("NE_") && !event.starts_with("BPE_") {
                issues.push(ValidationIssue::warning(
                    label,
                    "Events",
                    format!("Event '{event}' should start with NE_ or BPE_ prefix"),
                ));
            }
        }
    }

    fn check_conditions(row: &QuestRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        for condition in tokens(&row.conditions) {
            let condition = condition.strip_prefix('!').unwrap_or(condition);
            if !condition.starts_with("NC_") {
                issues.push(ValidationIssue::warning(
                    label,
                    "Conditions",
                    format!("Condition '{condition}' should start with NC_ prefix"),
                ));
            }
        }
    }

    fn check_rewards(row: &QuestRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        if row.rewards.is_empty() {
            return;
        }
        if !row.rewards.starts_with("Reward(") {
            issues.push(ValidationIssue::warning(
                label,
                "Rewards",
                "Rewards should use format: Reward(Currency=X,XP=Y,Items=...)",
            ));
        }
        if !row.rewards.contains('(') || !row.rewards.contains(')') {
            issues.push(ValidationIssue::error(
                label,
                "Rewards",
                "Invalid rewards format - missing parentheses",
            ));
        }
    }
}

impl RowValidator<QuestRow> for QuestValidator {
    fn validate_row(&self, row: &QuestRow, all_rows: &[QuestRow]) -> Vec<ValidationIssue> {
        let label = row.label();
        let mut issues = Vec::new();

        if row.quest_name.is_empty() {
            issues.push(ValidationIssue::error(&label, "QuestName", "Quest name is required"));
        }
        if row.state_id.is_empty() {
            issues.push(ValidationIssue::error(&label, "StateID", "State ID is required"));
        }

        if !row.quest_name.is_empty() && !row.state_id.is_empty() && Self::state_id_taken(row, all_rows) {
            issues.push(ValidationIssue::error(
                &label,
                "StateID",
                "State ID must be unique within quest",
            ));
        }

        if !row.quest_name.is_empty()
            && !row.parent_branch.is_empty()
            && !Self::parent_exists(row, all_rows)
        {
            issues.push(ValidationIssue::warning(
                &label,
                "ParentBranch",
                format!(
                    "Parent branch '{}' does not reference a valid state",
                    row.parent_branch
                ),
            ));
        }

        Self::check_tasks(row, &label, &mut issues);
        Self::check_events(row, &label, &mut issues);
        Self::check_conditions(row, &label, &mut issues);
        Self::check_rewards(row, &label, &mut issues);

        if matches!(row.state_type, QuestStateType::Success | QuestStateType::Failure)
            && row.rewards.is_empty()
        {
            issues.push(ValidationIssue::warning(
                &label,
                "Rewards",
                format!("{} state has no rewards defined", row.state_type),
            ));
        }

        issues
    }

    fn validate_table(&self, rows: &[QuestRow]) -> Vec<ValidationIssue> {
        let mut quests: BTreeMap<&str, Vec<&QuestRow>> = BTreeMap::new();
        for row in rows.iter().filter(|r| !r.deleted && !r.quest_name.is_empty()) {
            quests.entry(row.quest_name.as_str()).or_default().push(row);
        }

        let mut issues = Vec::new();
        for (quest, states) in quests {
            if !states.iter().any(|s| s.state_id.eq_ignore_ascii_case("Start")) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    quest,
                    None,
                    "Quest has no 'Start' state - first state will be used",
                ));
            }
            if !states.iter().any(|s| s.state_type == QuestStateType::Success) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    quest,
                    None,
                    "Quest has no Success state",
                ));
            }
        }
        issues
    }
}
