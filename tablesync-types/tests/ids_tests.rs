use std::collections::HashSet;
use std::str::FromStr;
use tablesync_types::{RowId, VersionToken};

// ── RowId ─────────────────────────────────────────────────────────

#[test]
fn row_id_new_is_unique() {
    let a = RowId::new();
    let b = RowId::new();
    assert_ne!(a, b);
}

#[test]
fn row_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = RowId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn row_id_display_and_parse() {
    let id = RowId::new();
    let parsed = RowId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn row_id_from_str_invalid() {
    assert!(RowId::from_str("garbage").is_err());
    assert!(RowId::parse("not-a-uuid").is_err());
}

#[test]
fn row_id_is_time_ordered() {
    let a = RowId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = RowId::new();
    assert!(a < b);
}

#[test]
fn row_id_hash_and_eq() {
    let id = RowId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn row_id_serializes_as_plain_string() {
    let id = RowId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let parsed: RowId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}

// ── VersionToken ──────────────────────────────────────────────────

#[test]
fn version_token_bump_changes_value() {
    let mut token = VersionToken::new();
    let before = token;
    let returned = token.bump();
    assert_ne!(before, token);
    assert_eq!(returned, token);
}

#[test]
fn version_token_parse_roundtrip() {
    let token = VersionToken::new();
    let parsed: VersionToken = token.to_string().parse().unwrap();
    assert_eq!(token, parsed);
}
