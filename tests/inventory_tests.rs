//! Tests for the Inventory layer
//!
//! These tests verify:
//! - Catalogue round trip through stream 0
//! - Member access by name, index and whole payload
//! - Lookup errors for unknown tags and members
//! - Malformed catalogue handling

use std::path::PathBuf;

use ddff::inventory::{InventoryEntry, INVENTORY_STREAM};
use ddff::{Config, Container, DdffError, Inventory, MemberKey, Schema, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.ddff");
    (temp_dir, path)
}

fn config() -> Config {
    Config::builder().block_size(128).sync_on_write(false).build()
}

/// Stream "position" (rx, ry) with ticks 0, 10, ..., 90 and stream "status"
fn write_sample(path: &PathBuf) {
    let mut inventory = Inventory::create(path, config()).unwrap();
    inventory
        .add_stream("position", &Schema::new("Position", &["rx", "ry"]))
        .unwrap();
    inventory
        .add_stream("status", &Schema::new("Status", &["state"]))
        .unwrap();

    for i in 0..10i64 {
        inventory
            .append(
                "position",
                i * 10,
                vec![Value::Float(i as f64), Value::Float(-(i as f64))],
            )
            .unwrap();
    }
    inventory
        .append("status", 0, vec![Value::from("idle")])
        .unwrap();
    inventory
        .append("status", 50, vec![Value::from("running")])
        .unwrap();
    inventory.close().unwrap();
}

fn as_f64s<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<f64> {
    values.map(|v| v.as_f64().unwrap()).collect()
}

// =============================================================================
// Catalogue Tests
// =============================================================================

#[test]
fn test_keys_lists_every_tag() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let keys: Vec<&str> = inventory.keys().collect();
    assert_eq!(keys, vec!["position", "status"]);
    assert_eq!(inventory.len(), 2);
}

#[test]
fn test_entries_carry_ids_and_schemas() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let entry = &inventory.inventory()["position"];
    assert_eq!(entry.stream_id, 1);
    assert_eq!(entry.schema.class, "Position");
    assert_eq!(entry.member_index("ry"), Some(1));

    let stream = inventory.get_by_id(2).unwrap();
    assert_eq!(stream.tag(), "status");
    assert_eq!(stream.class(), "Status");
}

#[test]
fn test_catalogue_is_stored_as_stream_zero_records() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let container = Container::open(&path, config()).unwrap();
    let catalogue = container.stream(INVENTORY_STREAM).unwrap();
    assert_eq!(catalogue.len(), 2);

    let first = catalogue.get(0).unwrap();
    assert_eq!(first.element(0), Some(&Value::from("position")));
    assert_eq!(first.element(1), Some(&Value::Int(1)));

    let description = first.element(2).and_then(Value::as_str).unwrap();
    let schema = Schema::from_json(description).unwrap();
    assert_eq!(schema.member_names().collect::<Vec<_>>(), vec!["rx", "ry"]);
}

#[test]
fn test_extra_member_keys_are_preserved() {
    let description = r#"{"class":"Pos","members":[{"name":"rx","unit":"m"},{"name":"ry"}]}"#;
    let entry = InventoryEntry::new("pos", 3, description).unwrap();

    assert_eq!(entry.schema.members[0].extra["unit"], "m");
    assert_eq!(entry.to_record().element(2), Some(&Value::from(description)));
}

#[test]
fn test_repeated_member_name_is_schema_error() {
    let description = r#"{"class":"Pos","members":[{"name":"rx"},{"name":"ry"},{"name":"rx"}]}"#;
    let result = InventoryEntry::new("pos", 3, description);
    assert!(matches!(result, Err(DdffError::Schema(_))));
}

#[test]
fn test_add_stream_with_repeated_member_allocates_nothing() {
    let (_temp, path) = setup_temp_file();
    let mut inventory = Inventory::create(&path, config()).unwrap();

    let result = inventory.add_stream("pos", &Schema::new("Pos", &["x", "x"]));
    assert!(matches!(result, Err(DdffError::Schema(_))));
    assert!(inventory.is_empty());

    // The next valid stream still gets the first data id
    let id = inventory
        .add_stream("pos", &Schema::new("Pos", &["x", "y"]))
        .unwrap();
    assert_eq!(id, 1);
    inventory.close().unwrap();
}

// =============================================================================
// Member Access Tests
// =============================================================================

#[test]
fn test_member_by_name_returns_positional_elements() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let rx = as_f64s(inventory.member("position", "rx").unwrap());
    let ry = as_f64s(inventory.member("position", "ry").unwrap());

    assert_eq!(rx, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    assert_eq!(ry, (0..10).map(|i| -(i as f64)).collect::<Vec<_>>());
}

#[test]
fn test_member_by_index_matches_name() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let stream = inventory.get("position").unwrap();
    let by_name: Vec<&Value> = stream.member("ry").unwrap().collect();
    let by_index: Vec<&Value> = stream.member(1usize).unwrap().collect();
    assert_eq!(by_name, by_index);
}

#[test]
fn test_member_none_returns_whole_payload() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let payloads: Vec<&Value> = inventory
        .member("status", MemberKey::Payload)
        .unwrap()
        .collect();

    assert_eq!(
        payloads,
        vec![
            &Value::Array(vec![Value::from("idle")]),
            &Value::Array(vec![Value::from("running")]),
        ]
    );
}

#[test]
fn test_time_returns_ticks() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let ticks: Vec<i64> = inventory
        .time("position")
        .unwrap()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(ticks, (0..10).map(|i| i * 10).collect::<Vec<_>>());
}

#[test]
fn test_sequences_are_restartable() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let stream = inventory.get("position").unwrap();

    let first: Vec<&Value> = stream.time().collect();
    let second: Vec<&Value> = stream.time().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 10);
}

// =============================================================================
// Lookup Error Tests
// =============================================================================

#[test]
fn test_undeclared_member_is_key_error() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    match inventory.member("position", "rz") {
        Err(DdffError::KeyNotFound { kind, .. }) => assert_eq!(kind, "member"),
        other => panic!("expected KeyNotFound, got {:?}", other.map(|v| v.count())),
    }
}

#[test]
fn test_member_index_out_of_range_is_key_error() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    let result = inventory.member("position", 2usize);
    assert!(matches!(result, Err(DdffError::KeyNotFound { .. })));
}

#[test]
fn test_unknown_tag_is_key_error() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    match inventory.get("velocity") {
        Err(DdffError::KeyNotFound { kind, key }) => {
            assert_eq!(kind, "stream");
            assert_eq!(key, "velocity");
        }
        other => panic!("expected KeyNotFound, got {:?}", other.map(|s| s.len())),
    }

    // The failed lookup does not affect later queries
    assert_eq!(inventory.get("status").unwrap().len(), 2);
}

#[test]
fn test_unknown_stream_id_is_key_error() {
    let (_temp, path) = setup_temp_file();
    write_sample(&path);

    let inventory = Inventory::open(&path, config()).unwrap();
    assert!(matches!(
        inventory.get_by_id(0),
        Err(DdffError::KeyNotFound { .. })
    ));
}

// =============================================================================
// Write Path Tests
// =============================================================================

#[test]
fn test_duplicate_tag_is_rejected() {
    let (_temp, path) = setup_temp_file();
    let mut inventory = Inventory::create(&path, config()).unwrap();
    let schema = Schema::new("Position", &["rx"]);

    assert_eq!(inventory.add_stream("position", &schema).unwrap(), 1);
    let result = inventory.add_stream("position", &schema);
    assert!(matches!(result, Err(DdffError::Schema(_))));
    inventory.close().unwrap();
}

#[test]
fn test_stream_without_records_reads_empty() {
    let (_temp, path) = setup_temp_file();
    let mut inventory = Inventory::create(&path, config()).unwrap();
    inventory
        .add_stream("silent", &Schema::new("Silent", &["x"]))
        .unwrap();
    inventory.close().unwrap();

    let inventory = Inventory::open(&path, config()).unwrap();
    let stream = inventory.get("silent").unwrap();
    assert!(stream.is_empty());
    assert_eq!(stream.member("x").unwrap().count(), 0);
}

#[test]
fn test_raw_container_without_catalogue() {
    let (_temp, path) = setup_temp_file();
    let mut container = Container::create(&path, config()).unwrap();
    let id = container.create_stream().unwrap();
    container.append(id, Value::Int(1)).unwrap();
    container.close().unwrap();

    let container = Container::open(&path, config()).unwrap();
    // Stream 0 here holds plain integers, not catalogue tuples
    assert!(matches!(Inventory::new(container), Err(DdffError::Schema(_))));
}

#[test]
fn test_invalid_description_json_is_schema_error() {
    let (_temp, path) = setup_temp_file();
    let mut container = Container::create(&path, config()).unwrap();
    container.create_stream().unwrap();
    container
        .append(
            INVENTORY_STREAM,
            Value::Array(vec![
                Value::from("broken"),
                Value::Int(1),
                Value::from("{not json"),
            ]),
        )
        .unwrap();
    container.close().unwrap();

    let result = Inventory::open(&path, config());
    assert!(matches!(result, Err(DdffError::Schema(_))));
}
