//! NPC definition table.

use crate::tags::{self, map_tag_list};
use crate::table::TableRow;
use serde::{Deserialize, Serialize};
use tablesync_merge::{SyncRow, SyncSide};
use tablesync_types::{ContentHash, ContentHasher, RowId, RowStatus};
use tablesync_validation::{RowValidator, Validatable, ValidationCache, ValidationIssue};

/// One NPC definition.
///
/// Asset references (blueprints, configs, appearances) and tag containers are
/// kept as opaque strings; only their text matters for syncing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcRow {
    pub row_id: RowId,

    // Identity
    pub npc_name: String,
    pub npc_id: String,
    pub display_name: String,
    pub allow_multiple_instances: bool,

    // Assets
    pub npc_blueprint: String,
    pub ability_config: String,
    pub activity_config: String,
    pub activity_schedules: String,
    pub default_appearance: String,
    pub trigger_sets: String,

    // Spawning
    pub spawner_poi: String,
    pub level_name: String,

    // Inventory
    pub default_currency: i32,
    pub default_items: String,

    // Vendor
    pub is_vendor: bool,
    pub shop_name: String,
    pub trading_currency: i32,
    pub buy_item_percentage: f32,
    pub sell_item_percentage: f32,
    pub trading_items: String,

    // Combat
    pub factions: String,
    pub owned_tags: String,
    pub min_level: i32,
    pub max_level: i32,
    pub attack_priority: f32,

    pub notes: String,
    pub deleted: bool,

    pub status: RowStatus,
    pub validation: ValidationCache,
}

impl Default for NpcRow {
    fn default() -> Self {
        Self {
            row_id: RowId::new(),
            npc_name: String::new(),
            npc_id: String::new(),
            display_name: String::new(),
            allow_multiple_instances: true,
            npc_blueprint: String::new(),
            ability_config: String::new(),
            activity_config: String::new(),
            activity_schedules: String::new(),
            default_appearance: String::new(),
            trigger_sets: String::new(),
            spawner_poi: String::new(),
            level_name: String::new(),
            default_currency: 0,
            default_items: String::new(),
            is_vendor: false,
            shop_name: String::new(),
            trading_currency: 500,
            buy_item_percentage: 0.5,
            sell_item_percentage: 1.5,
            trading_items: String::new(),
            factions: String::new(),
            owned_tags: String::new(),
            min_level: 1,
            max_level: 10,
            attack_priority: 0.5,
            notes: String::new(),
            deleted: false,
            status: RowStatus::New,
            validation: ValidationCache::default(),
        }
    }
}

impl NpcRow {
    /// Creates an NPC with the given name and id and default settings.
    pub fn new(npc_name: impl Into<String>, npc_id: impl Into<String>) -> Self {
        Self {
            npc_name: npc_name.into(),
            npc_id: npc_id.into(),
            ..Self::default()
        }
    }

    /// Returns true if the row has the two identifying fields set.
    pub fn is_valid(&self) -> bool {
        !self.npc_name.is_empty() && !self.npc_id.is_empty()
    }

    /// Factions as short names, e.g. `"Friendly, Town"`.
    pub fn factions_display(&self) -> String {
        map_tag_list(&self.factions, tags::to_short_faction_name)
    }

    /// Sets factions from short names, storing full tags.
    pub fn set_factions_from_display(&mut self, display: &str) {
        self.factions = map_tag_list(display, tags::to_full_faction_tag);
        self.validation.invalidate();
    }

    /// Owned state tags as short names.
    pub fn owned_tags_display(&self) -> String {
        map_tag_list(&self.owned_tags, tags::to_short_state_name)
    }

    /// Sets owned state tags from short names, storing full tags.
    pub fn set_owned_tags_from_display(&mut self, display: &str) {
        self.owned_tags = map_tag_list(display, tags::to_full_state_tag);
        self.validation.invalidate();
    }

    /// Label used in validation messages.
    fn label(&self) -> String {
        if self.npc_name.is_empty() {
            self.row_id.to_string()
        } else {
            self.npc_name.clone()
        }
    }
}

impl SyncRow for NpcRow {
    fn row_id(&self) -> RowId {
        self.row_id
    }

    fn set_row_id(&mut self, id: RowId) {
        self.row_id = id;
    }

    fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher
            .push(&self.npc_name)
            .push(&self.npc_id)
            .push(&self.display_name)
            .push(&self.allow_multiple_instances)
            .push(&self.npc_blueprint)
            .push(&self.ability_config)
            .push(&self.activity_config)
            .push(&self.activity_schedules)
            .push(&self.default_appearance)
            .push(&self.trigger_sets)
            .push(&self.spawner_poi)
            .push(&self.level_name)
            .push(&self.default_currency)
            .push(&self.default_items)
            .push(&self.is_vendor)
            .push(&self.shop_name)
            .push(&self.trading_currency)
            .push(&self.buy_item_percentage)
            .push(&self.sell_item_percentage)
            .push(&self.trading_items)
            .push(&self.factions)
            .push(&self.owned_tags)
            .push(&self.min_level)
            .push(&self.max_level)
            .push(&self.attack_priority)
            .push(&self.notes)
            .push(&self.deleted);
        hasher.finish()
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
            self.npc_name.push_str("_Remote");
            self.npc_id.push_str("_remote");
        }
    }
}

impl Validatable for NpcRow {
    fn validation(&self) -> &ValidationCache {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationCache {
        &mut self.validation
    }
}

impl TableRow for NpcRow {
    const DEFAULT_OUTPUT_FOLDER: &'static str = "/Game/NPCs";

    fn duplicate(&self) -> Self {
        Self {
            row_id: RowId::new(),
            npc_name: format!("{}_Copy", self.npc_name),
            npc_id: format!("{}_copy", self.npc_id),
            status: RowStatus::New,
            validation: ValidationCache::default(),
            ..self.clone()
        }
    }
}

/// Rules for NPC rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpcValidator;

impl NpcValidator {
    fn name_taken(row: &NpcRow, all_rows: &[NpcRow]) -> bool {
        all_rows.iter().any(|other| {
            other.row_id != row.row_id
                && !other.deleted
                && other.npc_name.eq_ignore_ascii_case(&row.npc_name)
        })
    }

    fn id_taken(row: &NpcRow, all_rows: &[NpcRow]) -> bool {
        all_rows.iter().any(|other| {
            other.row_id != row.row_id
                && !other.deleted
                && other.npc_id.eq_ignore_ascii_case(&row.npc_id)
        })
    }
}

impl RowValidator<NpcRow> for NpcValidator {
    fn validate_row(&self, row: &NpcRow, all_rows: &[NpcRow]) -> Vec<ValidationIssue> {
        let label = row.label();
        let mut issues = Vec::new();

        // Errors
        if row.npc_name.is_empty() {
            issues.push(ValidationIssue::error(&label, "NPCName", "NPC Name is required"));
        } else {
            if row.npc_name.contains(' ') {
                issues.push(ValidationIssue::error(
                    &label,
                    "NPCName",
                    "NPC Name cannot contain spaces (used for asset naming)",
                ));
            }
            if Self::name_taken(row, all_rows) {
                issues.push(ValidationIssue::error(&label, "NPCName", "NPC Name must be unique"));
            }
        }

        if row.npc_id.is_empty() {
            issues.push(ValidationIssue::error(&label, "NPCId", "NPC ID is required"));
        } else if Self::id_taken(row, all_rows) {
            issues.push(ValidationIssue::error(&label, "NPCId", "NPC ID must be unique"));
        }

        if row.min_level < 1 {
            issues.push(ValidationIssue::error(&label, "MinLevel", "Min Level must be at least 1"));
        }
        if row.max_level < 1 {
            issues.push(ValidationIssue::error(&label, "MaxLevel", "Max Level must be at least 1"));
        }
        if row.min_level > row.max_level {
            issues.push(ValidationIssue::error(
                &label,
                "LevelRange",
                format!(
                    "Min Level ({}) cannot be greater than Max Level ({})",
                    row.min_level, row.max_level
                ),
            ));
        }

        if row.is_vendor && row.shop_name.is_empty() {
            issues.push(ValidationIssue::error(
                &label,
                "ShopName",
                "Shop Name is required when Is Vendor is enabled",
            ));
        }

        if !(0.0..=1.0).contains(&row.attack_priority) {
            issues.push(ValidationIssue::error(
                &label,
                "AttackPriority",
                format!(
                    "Attack Priority must be between 0.0 and 1.0 (current: {:.2})",
                    row.attack_priority
                ),
            ));
        }

        // Warnings
        if row.display_name.is_empty() {
            issues.push(ValidationIssue::warning(
                &label,
                "DisplayName",
                "Display Name is empty - NPC will have no in-game name",
            ));
        }
        if row.npc_blueprint.is_empty() {
            issues.push(ValidationIssue::warning(
                &label,
                "Blueprint",
                "No NPC Blueprint assigned - NPC will need manual setup",
            ));
        }
        if row.ability_config.is_empty() {
            issues.push(ValidationIssue::warning(
                &label,
                "AbilityConfig",
                "No Ability Configuration assigned - NPC will have no abilities",
            ));
        }
        if row.activity_config.is_empty() {
            issues.push(ValidationIssue::warning(
                &label,
                "ActivityConfig",
                "No Activity Configuration assigned - NPC will have no activities",
            ));
        }
        if row.factions.is_empty() {
            issues.push(ValidationIssue::warning(
                &label,
                "Factions",
                "No factions assigned - NPC will be faction-less",
            ));
        }

        issues
    }
}
