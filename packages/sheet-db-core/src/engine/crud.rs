//! CRUD operations: create, read, update, remove, cascade, bulk read, list.
//!
//! Validation and defaulting always complete before any row mutation, so a
//! rejected write leaves the store untouched. Every mutation acquires the
//! store lock for exactly its own row-level change and invalidates the
//! table's cache slot on success.

use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::cache::CachedRows;
use crate::error::DbError;
use crate::response::Response;
use crate::schema::RegisteredTable;
use crate::value::CellValue;

use super::query::{apply_options, ListOptions};
use super::validation::{build_row, check_key_order, payload_object};
use super::Database;

impl Database {
    /// Creates a record, applying defaults and validation before any write.
    pub fn create(&self, table: &str, data: &Value, key_order: &[String]) -> Response {
        match self.create_inner(table, data, key_order) {
            Ok((id, record)) => Response::ok_with_id(id).with_data(record),
            Err(e) => {
                tracing::debug!(table, error = %e, "create rejected");
                e.into()
            }
        }
    }

    fn create_inner(
        &self,
        table: &str,
        data: &Value,
        key_order: &[String],
    ) -> Result<(u64, Value), DbError> {
        let schema = self.context.get(table)?;
        let payload = payload_object(data)?;
        let cells = build_row(&schema, payload, key_order, OffsetDateTime::now_utc())?;

        let id = self.lock.with_lock(|| {
            self.store.with_sheet_mut(table, |sheet| {
                let id = sheet.allocate_id();
                let mut row = Vec::with_capacity(cells.len() + 1);
                row.push(id.to_string());
                row.extend(cells.iter().cloned());
                sheet.append_row(row);
                id
            })
        })?;

        self.cache.invalidate(table);
        tracing::debug!(table, id, "record created");
        let record = record_from_cells(&schema, id, &cells)?;
        Ok((id, record))
    }

    /// Reads one record by id.
    pub fn read(&self, table: &str, id: u64) -> Response {
        match self.read_inner(table, id) {
            Ok(record) => Response::ok_with_data(record),
            Err(e) => e.into(),
        }
    }

    fn read_inner(&self, table: &str, id: u64) -> Result<Value, DbError> {
        let schema = self.context.get(table)?;
        let row = self
            .store
            .with_sheet(table, |sheet| {
                sheet.position_of(id).map(|pos| sheet.rows[pos].clone())
            })?
            .ok_or_else(|| DbError::RecordNotFound {
                table: table.to_string(),
                id,
            })?;
        record_from_row(&schema, &row)
    }

    /// Rewrites the full row: every configured field is recomputed from the
    /// payload plus defaults, never merged with the old row.
    pub fn update(&self, table: &str, id: u64, data: &Value, key_order: &[String]) -> Response {
        match self.update_inner(table, id, data, key_order) {
            Ok(record) => Response::ok_with_data(record),
            Err(e) => {
                tracing::debug!(table, id, error = %e, "update rejected");
                e.into()
            }
        }
    }

    fn update_inner(
        &self,
        table: &str,
        id: u64,
        data: &Value,
        key_order: &[String],
    ) -> Result<Value, DbError> {
        let schema = self.context.get(table)?;
        // An incomplete key order fails regardless of whether the id exists
        check_key_order(&schema, key_order)?;
        let payload = payload_object(data)?;
        let cells = build_row(&schema, payload, key_order, OffsetDateTime::now_utc())?;

        self.lock.with_lock(|| -> Result<(), DbError> {
            self.store.with_sheet_mut(table, |sheet| {
                let pos = sheet
                    .position_of(id)
                    .ok_or_else(|| DbError::RecordNotFound {
                        table: table.to_string(),
                        id,
                    })?;
                let mut row = Vec::with_capacity(cells.len() + 1);
                row.push(id.to_string());
                row.extend(cells.iter().cloned());
                sheet.overwrite_row(pos, row);
                Ok(())
            })?
        })?;

        self.cache.invalidate(table);
        tracing::debug!(table, id, "record updated");
        record_from_cells(&schema, id, &cells)
    }

    /// Removes a record, archiving its field values to the history table.
    pub fn remove(&self, table: &str, history_table: &str, id: u64) -> Response {
        match self.remove_inner(table, history_table, id) {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        }
    }

    pub(super) fn remove_inner(
        &self,
        table: &str,
        history_table: &str,
        id: u64,
    ) -> Result<(), DbError> {
        let schema = self.context.get(table)?;

        self.lock.with_lock(|| -> Result<(), DbError> {
            // History sheets normally exist from create_table; configs
            // registered without it still get an archive target.
            self.store.ensure_sheet(
                history_table,
                &schema.headers(),
                self.config.initial_table_capacity,
            );
            let row = self
                .store
                .with_sheet_mut(table, |sheet| {
                    let pos = sheet.position_of(id)?;
                    Some(sheet.delete_row(pos))
                })?
                .ok_or_else(|| DbError::RecordNotFound {
                    table: table.to_string(),
                    id,
                })?;
            self.store
                .with_sheet_mut(history_table, |sheet| sheet.append_row(row))?;
            Ok(())
        })?;

        self.cache.invalidate(table);
        self.cache.invalidate(history_table);
        tracing::debug!(table, id, history_table, "record archived and removed");
        Ok(())
    }

    /// Removes a record plus every junction row referencing it.
    ///
    /// Dependents are removed first, each under its own lock acquisition;
    /// the operation is not transactional across tables. Removing an already
    /// removed id reports 404, never a silent success.
    pub fn remove_with_cascade(&self, table: &str, history_table: &str, id: u64) -> Response {
        match self.remove_with_cascade_inner(table, history_table, id) {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        }
    }

    fn remove_with_cascade_inner(
        &self,
        table: &str,
        history_table: &str,
        id: u64,
    ) -> Result<(), DbError> {
        self.context.get(table)?;
        let exists = self
            .store
            .with_sheet(table, |sheet| sheet.position_of(id).is_some())?;
        if !exists {
            return Err(DbError::RecordNotFound {
                table: table.to_string(),
                id,
            });
        }

        for junction in self.context.junctions_referencing(table) {
            let Some(refs) = junction.config.junction.as_ref() else {
                continue;
            };
            let mut fk_fields = Vec::new();
            if refs.entity1_table == table {
                fk_fields.push(refs.entity1_field.clone());
            }
            if refs.entity2_table == table {
                fk_fields.push(refs.entity2_field.clone());
            }
            for field in fk_fields {
                let removed = self.delete_related_junction_inner(
                    &junction.config.table_name,
                    &junction.config.history_table_name,
                    id,
                    &field,
                )?;
                if removed > 0 {
                    tracing::debug!(
                        parent = table,
                        junction = %junction.config.table_name,
                        removed,
                        "cascade removed junction rows"
                    );
                }
            }
        }

        self.remove_inner(table, history_table, id)
    }

    /// Bulk read; absent ids are omitted rather than reported per id.
    pub fn read_id_list(&self, table: &str, ids: &[u64]) -> Response {
        match self.read_id_list_inner(table, ids) {
            Ok(records) => Response::ok_with_data(Value::Array(records)),
            Err(e) => e.into(),
        }
    }

    pub(super) fn read_id_list_inner(
        &self,
        table: &str,
        ids: &[u64],
    ) -> Result<Vec<Value>, DbError> {
        let schema = self.context.get(table)?;
        let requested: std::collections::HashSet<u64> = ids.iter().copied().collect();
        let rows: Vec<Vec<String>> = self.store.with_sheet(table, |sheet| {
            sheet
                .rows
                .iter()
                .filter(|row| {
                    row.first()
                        .and_then(|cell| cell.parse::<u64>().ok())
                        .is_some_and(|id| requested.contains(&id))
                })
                .cloned()
                .collect()
        })?;
        rows.iter().map(|row| record_from_row(&schema, row)).collect()
    }

    /// Returns every row, optionally sorted/paged and cache-assisted.
    ///
    /// History tables are readable here as well; they decode through the
    /// live table's schema.
    pub fn get_all(&self, table: &str, options: &ListOptions, use_cache: bool) -> Response {
        match self.get_all_inner(table, options, use_cache) {
            Ok(records) => Response::ok_with_data(Value::Array(records)),
            Err(e) => e.into(),
        }
    }

    fn get_all_inner(
        &self,
        table: &str,
        options: &ListOptions,
        use_cache: bool,
    ) -> Result<Vec<Value>, DbError> {
        let rows = self.table_snapshot(table, use_cache)?;
        Ok(apply_options(rows.as_ref().clone(), options))
    }

    /// Full decoded record set for a sheet, via the cache when allowed.
    pub(super) fn table_snapshot(
        &self,
        table: &str,
        use_cache: bool,
    ) -> Result<CachedRows, DbError> {
        if use_cache {
            if let Some(rows) = self.cache.get(table) {
                tracing::debug!(table, "cache hit");
                return Ok(rows);
            }
        }

        let schema = self.context.schema_for_sheet(table)?;
        let decoded = self.store.with_sheet(table, |sheet| {
            sheet
                .rows
                .iter()
                .map(|row| record_from_row(&schema, row))
                .collect::<Result<Vec<_>, _>>()
        })??;

        if use_cache {
            Ok(self.cache.put(table, decoded))
        } else {
            Ok(std::sync::Arc::new(decoded))
        }
    }
}

/// Decodes a stored row (id cell first) into a typed JSON record.
pub(super) fn record_from_row(schema: &RegisteredTable, row: &[String]) -> Result<Value, DbError> {
    let id = row
        .first()
        .and_then(|cell| cell.parse::<u64>().ok())
        .ok_or_else(|| {
            DbError::Storage(format!(
                "malformed id cell in '{}'",
                schema.config.table_name
            ))
        })?;
    record_from_cells(schema, id, row.get(1..).unwrap_or_default())
}

/// Builds the caller-facing JSON object for a record.
pub(super) fn record_from_cells(
    schema: &RegisteredTable,
    id: u64,
    cells: &[String],
) -> Result<Value, DbError> {
    if cells.len() != schema.fields.len() {
        return Err(DbError::Storage(format!(
            "row width mismatch in '{}'",
            schema.config.table_name
        )));
    }
    let mut record = Map::new();
    record.insert("id".to_string(), Value::from(id));
    for (field, cell) in schema.fields.iter().zip(cells) {
        record.insert(
            field.name.clone(),
            CellValue::decode(cell, field.field_type)?.to_json(),
        );
    }
    Ok(Value::Object(record))
}
