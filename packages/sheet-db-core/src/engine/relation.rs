//! Relationship management.
//!
//! Foreign-key lookups, junction table generation and CRUD, the two-hop
//! many-to-many join, bulk junction deletion, and orphan-integrity repair.
//! Everything here composes the CRUD primitives, so each internal mutation
//! takes its own turn on the store lock.

use serde_json::Value;

use crate::error::DbError;
use crate::response::Response;
use crate::schema::{
    DefaultValue, FieldDef, FieldSpec, FieldType, JunctionRefs, ManyToManyRequest, TableConfig,
    NOW_SENTINEL,
};

use super::query::{apply_options, ListOptions};
use super::Database;

impl Database {
    /// Rows in `table` whose `field_name` equals the foreign-key value.
    ///
    /// `field_index` is the 1-based stored-column position (`id` is column 1)
    /// and must agree with the normalized schema order.
    pub fn get_related_records(
        &self,
        foreign_key: u64,
        table: &str,
        field_name: &str,
        field_index: usize,
        options: &ListOptions,
        use_cache: bool,
    ) -> Response {
        match self.get_related_inner(foreign_key, table, field_name, field_index, options, use_cache)
        {
            Ok(records) => Response::ok_with_data(Value::Array(records)),
            Err(e) => e.into(),
        }
    }

    fn get_related_inner(
        &self,
        foreign_key: u64,
        table: &str,
        field_name: &str,
        field_index: usize,
        options: &ListOptions,
        use_cache: bool,
    ) -> Result<Vec<Value>, DbError> {
        let schema = self.context.get(table)?;
        let expected = schema
            .column_position(field_name)
            .ok_or_else(|| DbError::FieldNotFound {
                table: table.to_string(),
                field: field_name.to_string(),
            })?;
        if field_index != expected {
            return Err(DbError::FieldIndexMismatch {
                field: field_name.to_string(),
                given: field_index,
                expected,
            });
        }

        let rows = self.table_snapshot(table, use_cache)?;
        let matched = rows
            .iter()
            .filter(|record| field_matches(record, field_name, foreign_key))
            .cloned()
            .collect();
        Ok(apply_options(matched, options))
    }

    /// Synthesizes a junction table config for two registered entity tables.
    pub fn create_many_to_many_table_config(&self, request: &ManyToManyRequest) -> Response {
        match self.junction_config(request) {
            Ok(config) => match serde_json::to_value(&config) {
                Ok(data) => Response::ok_with_data(data),
                Err(e) => DbError::Storage(e.to_string()).into(),
            },
            Err(e) => e.into(),
        }
    }

    /// Typed form of [`Database::create_many_to_many_table_config`].
    ///
    /// Generated fields, in order: a creation timestamp defaulting to the
    /// current time, one foreign key per entity table, then the caller's
    /// shared fields in caller order.
    pub fn junction_config(&self, request: &ManyToManyRequest) -> Result<TableConfig, DbError> {
        for entity in [&request.entity1_table_name, &request.entity2_table_name] {
            if !self.context.is_registered(entity) {
                return Err(DbError::EntityNotRegistered {
                    table: entity.clone(),
                });
            }
        }

        let entity1_field = format!("{}_id", request.entity1_table_name.to_lowercase());
        let entity2_field = format!("{}_id", request.entity2_table_name.to_lowercase());
        let mut fields = vec![
            FieldDef::with_spec(
                "created_at",
                FieldSpec::new(FieldType::Date)
                    .with_default(DefaultValue::Text(NOW_SENTINEL.to_string())),
            ),
            FieldDef::required(&entity1_field, FieldType::Number),
            FieldDef::required(&entity2_field, FieldType::Number),
        ];
        fields.extend(request.fields_related_to_both_entities.iter().cloned());

        let table_name = format!(
            "{}_{}_RELATION",
            request.entity1_table_name, request.entity2_table_name
        );
        Ok(TableConfig {
            history_table_name: format!("DELETED_{table_name}"),
            table_name,
            fields,
            junction: Some(JunctionRefs {
                entity1_table: request.entity1_table_name.clone(),
                entity1_field,
                entity2_table: request.entity2_table_name.clone(),
                entity2_field,
            }),
        })
    }

    /// Creates a row in a junction table.
    pub fn create_junction_record(
        &self,
        junction_table: &str,
        data: &Value,
        key_order: &[String],
    ) -> Response {
        if let Err(e) = self.require_junction(junction_table) {
            return e.into();
        }
        self.create(junction_table, data, key_order)
    }

    /// Rewrites a junction row.
    pub fn update_junction_record(
        &self,
        junction_table: &str,
        id: u64,
        data: &Value,
        key_order: &[String],
    ) -> Response {
        if let Err(e) = self.require_junction(junction_table) {
            return e.into();
        }
        self.update(junction_table, id, data, key_order)
    }

    fn require_junction(&self, table: &str) -> Result<JunctionRefs, DbError> {
        let schema = self.context.get(table)?;
        schema
            .config
            .junction
            .clone()
            .ok_or_else(|| DbError::NotAJunctionTable {
                table: table.to_string(),
            })
    }

    /// Two-hop join: rows in `target_table` reachable from `source_id`
    /// through matching junction rows.
    pub fn get_junction_records(
        &self,
        junction_table: &str,
        source_table: &str,
        target_table: &str,
        source_id: u64,
        options: &ListOptions,
    ) -> Response {
        match self.get_junction_inner(junction_table, source_table, target_table, source_id, options)
        {
            Ok(records) => Response::ok_with_data(Value::Array(records)),
            Err(e) => e.into(),
        }
    }

    fn get_junction_inner(
        &self,
        junction_table: &str,
        source_table: &str,
        target_table: &str,
        source_id: u64,
        options: &ListOptions,
    ) -> Result<Vec<Value>, DbError> {
        let refs = self.require_junction(junction_table)?;
        self.context.get(source_table)?;
        self.context.get(target_table)?;

        let (source_field, target_field) =
            if refs.entity1_table == source_table && refs.entity2_table == target_table {
                (refs.entity1_field, refs.entity2_field)
            } else if refs.entity2_table == source_table && refs.entity1_table == target_table {
                (refs.entity2_field, refs.entity1_field)
            } else {
                // The junction does not connect the given pair
                return Err(DbError::TableNotFound {
                    table: source_table.to_string(),
                });
            };

        let junction_rows = self.table_snapshot(junction_table, false)?;
        let target_ids: Vec<u64> = junction_rows
            .iter()
            .filter(|record| field_matches(record, &source_field, source_id))
            .filter_map(|record| record.get(&target_field).and_then(Value::as_u64))
            .collect();

        let targets = self.read_id_list_inner(target_table, &target_ids)?;
        Ok(apply_options(targets, options))
    }

    /// Removes every junction row whose named foreign key matches the value,
    /// archiving each to history.
    pub fn delete_related_junction_records(
        &self,
        junction_table: &str,
        junction_history_table: &str,
        foreign_key: u64,
        field_name: &str,
    ) -> Response {
        match self.delete_related_junction_inner(
            junction_table,
            junction_history_table,
            foreign_key,
            field_name,
        ) {
            Ok(count) => Response::ok().with_count(count),
            Err(e) => e.into(),
        }
    }

    pub(super) fn delete_related_junction_inner(
        &self,
        junction_table: &str,
        junction_history_table: &str,
        foreign_key: u64,
        field_name: &str,
    ) -> Result<usize, DbError> {
        let schema = self.context.get(junction_table)?;
        let column = schema
            .column_position(field_name)
            .ok_or_else(|| DbError::FieldNotFound {
                table: junction_table.to_string(),
                field: field_name.to_string(),
            })?
            - 1;

        let matched: Vec<u64> = self.store.with_sheet(junction_table, |sheet| {
            sheet
                .rows
                .iter()
                .filter(|row| {
                    row.get(column)
                        .and_then(|cell| cell.parse::<f64>().ok())
                        .is_some_and(|value| value == foreign_key as f64)
                })
                .filter_map(|row| row.first().and_then(|cell| cell.parse::<u64>().ok()))
                .collect()
        })?;

        for id in &matched {
            self.remove_inner(junction_table, junction_history_table, *id)?;
        }
        Ok(matched.len())
    }

    /// Scans a junction table and repairs orphaned rows.
    ///
    /// Rows whose referenced entity records are gone are archived to history
    /// and removed. Idempotent: a repeat run with no new orphans reports 204
    /// with a count of zero.
    pub fn check_table_integrity(
        &self,
        junction_table: &str,
        junction_history_table: &str,
    ) -> Response {
        match self.check_integrity_inner(junction_table, junction_history_table) {
            Ok(0) => Response::no_content().with_count(0),
            Ok(count) => Response::ok().with_count(count),
            Err(e) => e.into(),
        }
    }

    fn check_integrity_inner(
        &self,
        junction_table: &str,
        junction_history_table: &str,
    ) -> Result<usize, DbError> {
        let refs = self.require_junction(junction_table)?;
        let rows = self.table_snapshot(junction_table, false)?;

        let mut orphans = Vec::new();
        for record in rows.iter() {
            let Some(id) = record.get("id").and_then(Value::as_u64) else {
                continue;
            };
            let entity1_alive =
                self.entity_exists(&refs.entity1_table, record.get(&refs.entity1_field))?;
            let entity2_alive =
                self.entity_exists(&refs.entity2_table, record.get(&refs.entity2_field))?;
            if !entity1_alive || !entity2_alive {
                orphans.push(id);
            }
        }

        for id in &orphans {
            self.remove_inner(junction_table, junction_history_table, *id)?;
        }
        if !orphans.is_empty() {
            tracing::warn!(
                table = junction_table,
                cleaned = orphans.len(),
                "orphaned junction rows archived"
            );
        }
        Ok(orphans.len())
    }

    fn entity_exists(
        &self,
        entity_table: &str,
        foreign_key: Option<&Value>,
    ) -> Result<bool, DbError> {
        let Some(id) = foreign_key.and_then(Value::as_u64) else {
            return Ok(false);
        };
        self.store
            .with_sheet(entity_table, |sheet| sheet.position_of(id).is_some())
    }
}

/// Numeric equality between a record field and a foreign-key value.
fn field_matches(record: &Value, field: &str, foreign_key: u64) -> bool {
    record
        .get(field)
        .and_then(Value::as_f64)
        .is_some_and(|value| value == foreign_key as f64)
}
