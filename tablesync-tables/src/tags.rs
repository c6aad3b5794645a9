//! Conversions between short tag names shown in the spreadsheet and the
//! full gameplay tags stored on rows.

const FACTION_PREFIX: &str = "Narrative.Factions.";
const STATE_PREFIX: &str = "Narrative.State.";

/// `"Friendly"` → `"Narrative.Factions.Friendly"`. Empty input stays empty.
pub fn to_full_faction_tag(short: &str) -> String {
    let trimmed = short.trim();
    if trimmed.is_empty() || trimmed.starts_with(FACTION_PREFIX) {
        return trimmed.to_string();
    }
    format!("{FACTION_PREFIX}{trimmed}")
}

/// `"Narrative.Factions.Friendly"` → `"Friendly"`.
pub fn to_short_faction_name(full: &str) -> String {
    let trimmed = full.trim();
    trimmed
        .strip_prefix(FACTION_PREFIX)
        .unwrap_or(trimmed)
        .to_string()
}

/// `"Invulnerable"` or `"State.Invulnerable"` → `"Narrative.State.Invulnerable"`.
pub fn to_full_state_tag(short: &str) -> String {
    let trimmed = short.trim();
    if trimmed.is_empty() || trimmed.starts_with(STATE_PREFIX) {
        trimmed.to_string()
    } else if trimmed.starts_with("State.") {
        format!("Narrative.{trimmed}")
    } else {
        format!("{STATE_PREFIX}{trimmed}")
    }
}

/// `"Narrative.State.Invulnerable"` → `"Invulnerable"`.
pub fn to_short_state_name(full: &str) -> String {
    let trimmed = full.trim();
    trimmed
        .strip_prefix(STATE_PREFIX)
        .unwrap_or(trimmed)
        .to_string()
}

/// Maps every comma-separated entry of `list` through `convert`, dropping
/// empty results, and joins with `", "`.
pub(crate) fn map_tag_list(list: &str, convert: fn(&str) -> String) -> String {
    list.split(',')
        .map(convert)
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
