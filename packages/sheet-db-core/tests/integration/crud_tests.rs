//! Full CRUD lifecycle, bulk reads, listing options, and error paths.

use serde_json::json;
use sheet_db_core::{FieldDef, FieldType, ListOptions, SortOrder, TableConfig};

use super::common::{category_config, engine, keys, now_text, product_config};

#[test]
fn category_crud_cycle() {
    let db = engine();
    assert_eq!(db.creation_result().status, 200);

    let config = category_config();
    assert_eq!(db.create_table(&config).status, 200);

    // Create
    let created = db.create(
        "CATEGORY",
        &json!({"name": "Test Category", "created_at": now_text()}),
        &keys(&config),
    );
    assert_eq!(created.status, 200);
    let id = created.id.expect("create returns an id");

    // Read
    let read = db.read("CATEGORY", id);
    assert_eq!(read.status, 200);
    assert_eq!(read.data.unwrap()["name"], json!("Test Category"));

    // Update
    let updated = db.update(
        "CATEGORY",
        id,
        &json!({"name": "Updated Category", "created_at": now_text()}),
        &keys(&config),
    );
    assert_eq!(updated.status, 200);
    let read = db.read("CATEGORY", id);
    assert_eq!(read.data.unwrap()["name"], json!("Updated Category"));

    // Remove, then the id is gone for good
    assert_eq!(db.remove("CATEGORY", "DELETED_CATEGORY", id).status, 200);
    assert_eq!(db.read("CATEGORY", id).status, 404);
    assert_eq!(db.remove("CATEGORY", "DELETED_CATEGORY", id).status, 404);
}

#[test]
fn round_trip_preserves_supplied_values() {
    let db = engine();
    let config = product_config();
    db.create_table(&config);

    let created_at = now_text();
    let created = db.create(
        "PRODUCT",
        &json!({
            "name": "Test Product",
            "price": 99.99,
            "category_fk": 3,
            "created_at": created_at,
        }),
        &keys(&config),
    );
    assert_eq!(created.status, 200);

    let data = db.read("PRODUCT", created.id.unwrap()).data.unwrap();
    assert_eq!(data["name"], json!("Test Product"));
    assert_eq!(data["price"], json!(99.99));
    assert_eq!(data["category_fk"], json!(3));
    assert_eq!(data["created_at"], json!(created_at));
}

#[test]
fn duplicate_registration_is_a_conflict() {
    let db = engine();
    let config = category_config();

    // create_table registers as a side effect, so a follow-up registration
    // of the same config is the conflicting call
    assert_eq!(db.create_table(&config).status, 200);
    assert_eq!(db.put_table_into_context(&config).status, 500);
    assert_eq!(db.put_table_into_context(&config).status, 500);

    // but re-creating the table stays idempotent
    assert_eq!(db.create_table(&config).status, 200);
}

#[test]
fn operations_on_unregistered_tables_are_404() {
    let db = engine();
    assert_eq!(db.read("NOWHERE", 1).status, 404);
    assert_eq!(db.create("NOWHERE", &json!({}), &[]).status, 404);
    assert_eq!(
        db.get_all("NOWHERE", &ListOptions::default(), false).status,
        404
    );
}

#[test]
fn read_id_list_omits_absent_ids() {
    let db = engine();
    let config = product_config();
    db.create_table(&config);

    let mut ids = Vec::new();
    for i in 1..=3 {
        let created = db.create(
            "PRODUCT",
            &json!({
                "name": format!("Product {i}"),
                "price": 10.0 * f64::from(i),
                "category_fk": 1,
                "created_at": now_text(),
            }),
            &keys(&config),
        );
        ids.push(created.id.unwrap());
    }

    let mut requested = ids.clone();
    requested.push(99_999);
    let listed = db.read_id_list("PRODUCT", &requested);
    assert_eq!(listed.status, 200);

    let data = listed.data.unwrap();
    let records = data.as_array().unwrap();
    assert_eq!(records.len(), 3);
    let mut found: Vec<u64> = records
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    found.sort_unstable();
    assert_eq!(found, ids);
}

#[test]
fn get_all_supports_sorting_and_paging() {
    let db = engine();
    let config = TableConfig::new(
        "GETALL_TEST",
        "DELETED_GETALL_TEST",
        vec![
            FieldDef::required("name", FieldType::String),
            FieldDef::required("value", FieldType::Number),
        ],
    );
    db.create_table(&config);

    for i in 1..=5 {
        db.create(
            "GETALL_TEST",
            &json!({"name": format!("Record {i}"), "value": i * 10}),
            &keys(&config),
        );
    }

    let all = db.get_all("GETALL_TEST", &ListOptions::default(), false);
    assert_eq!(all.status, 200);
    assert_eq!(all.data.unwrap().as_array().unwrap().len(), 5);

    let sorted = db.get_all(
        "GETALL_TEST",
        &ListOptions {
            sort_by: Some("value".to_string()),
            sort_order: SortOrder::Desc,
            ..ListOptions::default()
        },
        false,
    );
    let data = sorted.data.unwrap();
    let records = data.as_array().unwrap();
    assert_eq!(records[0]["value"], json!(50));
    assert_eq!(records[4]["value"], json!(10));

    let paged = db.get_all(
        "GETALL_TEST",
        &ListOptions {
            sort_by: Some("name".to_string()),
            page: Some(1),
            page_size: Some(3),
            ..ListOptions::default()
        },
        false,
    );
    assert_eq!(paged.data.unwrap().as_array().unwrap().len(), 3);
}

#[test]
fn incomplete_key_order_fails_regardless_of_target() {
    let db = engine();
    let config = TableConfig::new(
        "ERROR_TEST",
        "DELETED_ERROR_TEST",
        vec![
            FieldDef::required("name", FieldType::String),
            FieldDef::required("value", FieldType::Number),
        ],
    );
    db.create_table(&config);

    let created = db.create(
        "ERROR_TEST",
        &json!({"name": "Test", "value": 42}),
        &keys(&config),
    );
    assert_eq!(created.status, 200);
    let id = created.id.unwrap();

    // Existing id
    let rejected = db.update(
        "ERROR_TEST",
        id,
        &json!({"name": "Updated"}),
        &["name".to_string()],
    );
    assert_eq!(rejected.status, 400);
    assert!(rejected.error.unwrap().contains("Incomplete keyOrder"));

    // Missing id: still the key-order failure, not a 404
    let rejected = db.update(
        "ERROR_TEST",
        99_999,
        &json!({"name": "Updated"}),
        &["name".to_string()],
    );
    assert_eq!(rejected.status, 400);
    assert!(rejected.error.unwrap().contains("Incomplete keyOrder"));

    let rejected = db.create("ERROR_TEST", &json!({"name": "Test"}), &["name".to_string()]);
    assert_eq!(rejected.status, 400);
    assert!(rejected.error.unwrap().contains("Incomplete keyOrder"));
}

#[test]
fn missing_required_fields_and_bad_types_are_400() {
    let db = engine();
    let config = TableConfig::new(
        "ERROR_TEST2",
        "DELETED_ERROR_TEST2",
        vec![
            FieldDef::required("name", FieldType::String),
            FieldDef::required("value", FieldType::Number),
        ],
    );
    db.create_table(&config);

    let missing = db.create("ERROR_TEST2", &json!({"name": "Test"}), &keys(&config));
    assert_eq!(missing.status, 400);
    assert!(missing.error.unwrap().contains("Missing required fields"));

    let bad_types = db.create(
        "ERROR_TEST2",
        &json!({"name": 123, "value": "invalid"}),
        &keys(&config),
    );
    assert_eq!(bad_types.status, 400);
    assert!(bad_types.error.is_some());

    let update_missing = db.update("ERROR_TEST2", 99_999, &json!({}), &keys(&config));
    assert_eq!(update_missing.status, 400);
}

#[test]
fn update_on_absent_id_is_404() {
    let db = engine();
    let config = category_config();
    db.create_table(&config);

    let result = db.update(
        "CATEGORY",
        99_999,
        &json!({"name": "Ghost", "created_at": now_text()}),
        &keys(&config),
    );
    assert_eq!(result.status, 404);
    assert!(result.error.is_some());
}

#[test]
fn success_envelopes_omit_error_fields() {
    let db = engine();
    let config = category_config();
    db.create_table(&config);

    let created = db.create(
        "CATEGORY",
        &json!({"name": "Envelope", "created_at": now_text()}),
        &keys(&config),
    );
    let serialized = serde_json::to_value(&created).unwrap();
    assert_eq!(serialized["status"], json!(200));
    assert!(serialized.get("error").is_none());
    assert!(serialized.get("count").is_none());
}

#[test]
fn history_table_receives_removed_rows() {
    let db = engine();
    let config = category_config();
    db.create_table(&config);

    let created = db.create(
        "CATEGORY",
        &json!({"name": "Doomed", "created_at": now_text()}),
        &keys(&config),
    );
    let id = created.id.unwrap();
    db.remove("CATEGORY", "DELETED_CATEGORY", id);

    let archived = db.get_all("DELETED_CATEGORY", &ListOptions::default(), false);
    assert_eq!(archived.status, 200);
    let data = archived.data.unwrap();
    let rows = data.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(id));
    assert_eq!(rows[0]["name"], json!("Doomed"));
}

#[test]
fn color_schemes_resolve_or_conflict() {
    let db = engine();
    let config = category_config();
    db.create_table(&config);

    let applied = db.apply_color_scheme("CATEGORY", "red");
    assert_eq!(applied.status, 200);
    let data = applied.data.unwrap();
    assert_eq!(data["headerColor"], json!("#E53935"));
    assert_eq!(data["color1"], json!("#FFCDD2"));
    assert_eq!(data["color2"], json!("#FFEBEE"));

    assert_eq!(db.apply_color_scheme("CATEGORY", "emerald").status, 500);
    assert_eq!(db.apply_color_scheme("NOWHERE", "red").status, 404);
}
