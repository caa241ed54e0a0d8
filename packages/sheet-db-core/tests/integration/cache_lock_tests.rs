//! Cache equivalence and lock behavior under the public contract.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use serde_json::json;
use sheet_db_core::{FieldDef, FieldType, ListOptions, TableConfig};

use super::common::{engine, keys};

fn cache_config() -> TableConfig {
    TableConfig::new(
        "CACHE_TEST",
        "DELETED_CACHE_TEST",
        vec![
            FieldDef::required("name", FieldType::String),
            FieldDef::required("value", FieldType::Number),
        ],
    )
}

#[test]
fn cached_reads_match_uncached_reads() {
    let db = engine();
    let config = cache_config();
    db.create_table(&config);

    for i in 1..=3 {
        db.create(
            "CACHE_TEST",
            &json!({"name": format!("Cache Item {i}"), "value": i * 100}),
            &keys(&config),
        );
    }

    let uncached = db.get_all("CACHE_TEST", &ListOptions::default(), false);
    let cached_first = db.get_all("CACHE_TEST", &ListOptions::default(), true);
    let cached_second = db.get_all("CACHE_TEST", &ListOptions::default(), true);

    assert_eq!(uncached.status, 200);
    assert_eq!(cached_first.status, 200);
    assert_eq!(uncached.data, cached_first.data);
    assert_eq!(cached_first.data, cached_second.data);
}

#[test]
fn writes_invalidate_the_cache() {
    let db = engine();
    let config = cache_config();
    db.create_table(&config);

    db.create(
        "CACHE_TEST",
        &json!({"name": "First", "value": 1}),
        &keys(&config),
    );
    let warm = db.get_all("CACHE_TEST", &ListOptions::default(), true);
    assert_eq!(warm.data.unwrap().as_array().unwrap().len(), 1);

    // Create
    let second = db
        .create(
            "CACHE_TEST",
            &json!({"name": "Second", "value": 2}),
            &keys(&config),
        )
        .id
        .unwrap();
    let after_create = db.get_all("CACHE_TEST", &ListOptions::default(), true);
    assert_eq!(after_create.data.unwrap().as_array().unwrap().len(), 2);

    // Update
    db.update(
        "CACHE_TEST",
        second,
        &json!({"name": "Second Updated", "value": 2}),
        &keys(&config),
    );
    let after_update = db.get_all("CACHE_TEST", &ListOptions::default(), true);
    let data = after_update.data.unwrap();
    assert!(data
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["name"] == json!("Second Updated")));

    // Remove
    db.remove("CACHE_TEST", "DELETED_CACHE_TEST", second);
    let after_remove = db.get_all("CACHE_TEST", &ListOptions::default(), true);
    assert_eq!(after_remove.data.unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn cached_and_uncached_related_reads_agree() {
    let db = engine();
    let config = TableConfig::new(
        "RELATED_CACHE",
        "DELETED_RELATED_CACHE",
        vec![
            FieldDef::required("name", FieldType::String),
            FieldDef::required("parent_fk", FieldType::Number),
        ],
    );
    db.create_table(&config);

    for i in 1..=4 {
        db.create(
            "RELATED_CACHE",
            &json!({"name": format!("Child {i}"), "parent_fk": i % 2}),
            &keys(&config),
        );
    }

    let uncached = db.get_related_records(
        0,
        "RELATED_CACHE",
        "parent_fk",
        3,
        &ListOptions::default(),
        false,
    );
    let cached = db.get_related_records(
        0,
        "RELATED_CACHE",
        "parent_fk",
        3,
        &ListOptions::default(),
        true,
    );
    assert_eq!(uncached.status, 200);
    assert_eq!(cached.status, 200);
    assert_eq!(uncached.data, cached.data);
}

#[test]
fn release_locks_leaves_the_store_usable() {
    let db = engine();
    let config = cache_config();
    db.create_table(&config);

    let created = db.create(
        "CACHE_TEST",
        &json!({"name": "Lock Test", "value": 100}),
        &keys(&config),
    );
    assert_eq!(created.status, 200);

    assert_eq!(db.release_locks().status, 200);

    let read = db.read("CACHE_TEST", created.id.unwrap());
    assert_eq!(read.status, 200);
    let write = db.create(
        "CACHE_TEST",
        &json!({"name": "After Release", "value": 200}),
        &keys(&config),
    );
    assert_eq!(write.status, 200);
}

#[test]
fn concurrent_creates_serialize_without_losing_rows() {
    let db = Arc::new(engine());
    let config = cache_config();
    db.create_table(&config);

    let key_order = keys(&config);
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let db = db.clone();
            let key_order = key_order.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let created = db.create(
                        "CACHE_TEST",
                        &json!({"name": format!("w{worker}-{i}"), "value": i}),
                        &key_order,
                    );
                    assert_eq!(created.status, 200);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = db.get_all("CACHE_TEST", &ListOptions::default(), false);
    let data = all.data.unwrap();
    let records = data.as_array().unwrap();
    assert_eq!(records.len(), 100);

    let ids: HashSet<u64> = records.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids.len(), 100, "ids are unique and never reused");
}
