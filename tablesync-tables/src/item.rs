//! Item definition table.

use crate::table::TableRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use tablesync_merge::{SyncRow, SyncSide};
use tablesync_types::{ContentHash, ContentHasher, RowId, RowStatus};
use tablesync_validation::{RowValidator, Validatable, ValidationCache, ValidationIssue};

/// Kind of item, which decides the stats an item is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Consumable,
    Ammo,
    WeaponAttachment,
    #[default]
    Equippable,
    Clothing,
    ThrowableWeapon,
    MeleeWeapon,
    RangedWeapon,
    MagicWeapon,
}

impl ItemType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consumable => "Consumable",
            Self::Ammo => "Ammo",
            Self::WeaponAttachment => "WeaponAttachment",
            Self::Equippable => "Equippable",
            Self::Clothing => "Clothing",
            Self::ThrowableWeapon => "ThrowableWeapon",
            Self::MeleeWeapon => "MeleeWeapon",
            Self::RangedWeapon => "RangedWeapon",
            Self::MagicWeapon => "MagicWeapon",
        }
    }

    pub const fn is_weapon(&self) -> bool {
        matches!(
            self,
            Self::ThrowableWeapon | Self::MeleeWeapon | Self::RangedWeapon | Self::MagicWeapon
        )
    }

    const fn code(&self) -> u8 {
        match self {
            Self::Consumable => 0,
            Self::Ammo => 1,
            Self::WeaponAttachment => 2,
            Self::Equippable => 3,
            Self::Clothing => 4,
            Self::ThrowableWeapon => 5,
            Self::MeleeWeapon => 6,
            Self::RangedWeapon => 7,
            Self::MagicWeapon => 8,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item definition.
///
/// `abilities`, `fragments` and `item_tags` are comma-separated lists.
/// `modifier_ge` and `gameplay_effect_class` are asset paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRow {
    pub row_id: RowId,

    // Identity
    pub item_name: String,
    pub display_name: String,
    pub item_type: ItemType,
    pub equipment_slot: String,
    pub base_value: i32,
    pub weight: f32,
    pub description: String,
    pub base_score: f32,

    // Combat
    pub attack_rating: f32,
    pub armor_rating: f32,
    pub stealth_rating: f32,

    // Weapon
    pub attack_damage: f32,
    pub heavy_attack_damage_multiplier: f32,
    pub weapon_hand: String,
    pub clip_size: i32,
    pub required_ammo: String,
    pub allow_manual_reload: bool,
    pub bot_attack_range: f32,

    // Ranged
    pub base_spread_degrees: f32,
    pub max_spread_degrees: f32,
    pub spread_fire_bump: f32,
    pub spread_decrease_speed: f32,
    pub aim_fov_pct: f32,

    // Consumable
    pub consume_on_use: bool,
    pub use_recharge_duration: f32,
    pub can_activate: bool,
    pub gameplay_effect_class: String,

    // References
    pub modifier_ge: String,
    pub abilities: String,
    pub fragments: String,
    pub item_tags: String,
    pub stackable: bool,
    pub max_stack_size: i32,

    pub notes: String,
    pub deleted: bool,

    pub status: RowStatus,
    /// Path of the asset generated from this item, if any.
    pub generated_item: Option<String>,
    pub validation: ValidationCache,
}

impl Default for ItemRow {
    fn default() -> Self {
        Self {
            row_id: RowId::new(),
            item_name: String::new(),
            display_name: String::new(),
            item_type: ItemType::Equippable,
            equipment_slot: String::new(),
            base_value: 0,
            weight: 1.0,
            description: String::new(),
            base_score: 0.0,
            attack_rating: 0.0,
            armor_rating: 0.0,
            stealth_rating: 0.0,
            attack_damage: 0.0,
            heavy_attack_damage_multiplier: 1.5,
            weapon_hand: "TwoHanded".to_string(),
            clip_size: 0,
            required_ammo: String::new(),
            allow_manual_reload: true,
            bot_attack_range: 200.0,
            base_spread_degrees: 1.0,
            max_spread_degrees: 8.0,
            spread_fire_bump: 0.5,
            spread_decrease_speed: 4.0,
            aim_fov_pct: 0.7,
            consume_on_use: true,
            use_recharge_duration: 0.0,
            can_activate: false,
            gameplay_effect_class: String::new(),
            modifier_ge: String::new(),
            abilities: String::new(),
            fragments: String::new(),
            item_tags: String::new(),
            stackable: false,
            max_stack_size: 1,
            notes: String::new(),
            deleted: false,
            status: RowStatus::New,
            generated_item: None,
            validation: ValidationCache::default(),
        }
    }
}

impl ItemRow {
    pub fn new(item_name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            item_name: item_name.into(),
            item_type,
            ..Self::default()
        }
    }

    /// Equippable or clothing worn in an armor slot.
    pub fn is_armor(&self) -> bool {
        matches!(self.item_type, ItemType::Equippable | ItemType::Clothing)
            && self.equipment_slot.contains("Armor")
    }

    fn label(&self) -> String {
        if self.item_name.is_empty() {
            "Unknown".to_string()
        } else {
            self.item_name.clone()
        }
    }
}

impl SyncRow for ItemRow {
    fn row_id(&self) -> RowId {
        self.row_id
    }

    fn set_row_id(&mut self, id: RowId) {
        self.row_id = id;
    }

    fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher
            .push(&self.item_name)
            .push(&self.display_name)
            .push(&self.item_type.code())
            .push(&self.equipment_slot)
            .push(&self.base_value)
            .push(&self.weight)
            .push(&self.description)
            .push(&self.base_score);
        hasher
            .push(&self.attack_rating)
            .push(&self.armor_rating)
            .push(&self.stealth_rating);
        hasher
            .push(&self.attack_damage)
            .push(&self.heavy_attack_damage_multiplier)
            .push(&self.weapon_hand)
            .push(&self.clip_size)
            .push(&self.required_ammo)
            .push(&self.allow_manual_reload)
            .push(&self.bot_attack_range);
        hasher
            .push(&self.base_spread_degrees)
            .push(&self.max_spread_degrees)
            .push(&self.spread_fire_bump)
            .push(&self.spread_decrease_speed)
            .push(&self.aim_fov_pct);
        hasher
            .push(&self.consume_on_use)
            .push(&self.use_recharge_duration)
            .push(&self.can_activate)
            .push(&self.gameplay_effect_class);
        hasher
            .push(&self.modifier_ge)
            .push(&self.abilities)
            .push(&self.fragments)
            .push(&self.item_tags)
            .push(&self.stackable)
            .push(&self.max_stack_size)
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
            self.item_name.push_str("_Remote");
            self.generated_item = None;
        }
    }
}

impl Validatable for ItemRow {
    fn validation(&self) -> &ValidationCache {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationCache {
        &mut self.validation
    }
}

impl TableRow for ItemRow {
    const DEFAULT_OUTPUT_FOLDER: &'static str = "/Game/Items";

    fn duplicate(&self) -> Self {
        Self {
            row_id: RowId::new(),
            item_name: format!("{}_Copy", self.item_name),
            status: RowStatus::New,
            generated_item: None,
            validation: ValidationCache::default(),
            ..self.clone()
        }
    }
}

/// Rules for item rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemValidator;

/// Asset name of a path such as `/Game/Items/GE_Heal.GE_Heal`.
fn asset_name(path: &str) -> &str {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.split_once('.').map_or(last, |(_, object)| object)
}

impl ItemValidator {
    fn name_taken(row: &ItemRow, all_rows: &[ItemRow]) -> bool {
        all_rows.iter().any(|other| {
            other.row_id != row.row_id
                && !other.deleted
                && other.item_name.eq_ignore_ascii_case(&row.item_name)
        })
    }

    fn check_equipment_slot(row: &ItemRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        if row.item_type != ItemType::Consumable && row.equipment_slot.is_empty() {
            issues.push(ValidationIssue::warning(
                label,
                "EquipmentSlot",
                "Equipment slot not specified for equippable item",
            ));
        }
        if !row.equipment_slot.is_empty() && !row.equipment_slot.contains('.') {
            issues.push(ValidationIssue::warning(
                label,
                "EquipmentSlot",
                "Equipment slot should be a gameplay tag (e.g., Narrative.Equipment.Slot.Weapon)",
            ));
        }
    }

    fn check_combat_stats(row: &ItemRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        let weapon = row.item_type.is_weapon();
        if weapon && row.attack_rating <= 0.0 {
            issues.push(ValidationIssue::warning(label, "AttackRating", "Weapon has no attack rating"));
        }
        if !weapon && row.attack_rating > 0.0 {
            issues.push(ValidationIssue::warning(
                label,
                "AttackRating",
                "Attack rating specified for non-weapon item",
            ));
        }
        if row.is_armor() && row.armor_rating <= 0.0 {
            issues.push(ValidationIssue::warning(label, "ArmorRating", "Armor has no armor rating"));
        }
        if weapon && row.armor_rating > 0.0 {
            issues.push(ValidationIssue::warning(
                label,
                "ArmorRating",
                "Armor rating specified for weapon item",
            ));
        }
    }

    fn check_references(row: &ItemRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        if !row.modifier_ge.is_empty() && !asset_name(&row.modifier_ge).starts_with("GE_") {
            issues.push(ValidationIssue::warning(
                label,
                "ModifierGE",
                "Modifier GE should start with GE_ prefix",
            ));
        }
        let abilities = row.abilities.split(',').map(str::trim).filter(|a| !a.is_empty());
        for ability in abilities {
            if !ability.starts_with("GA_") {
                issues.push(ValidationIssue::warning(
                    label,
                    "Abilities",
                    format!("Ability '{ability}' should start with GA_ prefix"),
                ));
            }
        }
    }

    fn check_stacking(row: &ItemRow, label: &str, issues: &mut Vec<ValidationIssue>) {
        if row.stackable && row.max_stack_size <= 1 {
            issues.push(ValidationIssue::warning(
                label,
                "MaxStackSize",
                "Stackable item has max stack size <= 1",
            ));
        }
        if !row.stackable && row.max_stack_size > 1 {
            issues.push(ValidationIssue::warning(
                label,
                "bStackable",
                "Non-stackable item has max stack size > 1",
            ));
        }
        if row.stackable && (row.item_type == ItemType::Equippable || row.item_type.is_weapon()) {
            issues.push(ValidationIssue::warning(
                label,
                "bStackable",
                "Equipment/weapons typically shouldn't be stackable",
            ));
        }
    }
}

impl RowValidator<ItemRow> for ItemValidator {
    fn validate_row(&self, row: &ItemRow, all_rows: &[ItemRow]) -> Vec<ValidationIssue> {
        let label = row.label();
        let mut issues = Vec::new();

        // Nothing else is checkable without a name.
        if row.item_name.is_empty() {
            issues.push(ValidationIssue::error(&label, "ItemName", "Item name is required"));
            return issues;
        }
        if Self::name_taken(row, all_rows) {
            issues.push(ValidationIssue::error(&label, "ItemName", "Item name must be unique"));
        }
        if row.display_name.is_empty() {
            issues.push(ValidationIssue::warning(
                &label,
                "DisplayName",
                "Display name is empty - item name will be used",
            ));
        }

        Self::check_equipment_slot(row, &label, &mut issues);
        Self::check_combat_stats(row, &label, &mut issues);
        Self::check_references(row, &label, &mut issues);
        Self::check_stacking(row, &label, &mut issues);
        issues
    }
}
