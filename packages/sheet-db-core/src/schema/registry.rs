//! Schema context: registered table configs and the junction reference graph.
//!
//! One context per engine instance; there is no process-global state.
//! Junction edges are recorded at registration time so cascade and integrity
//! operations traverse explicit references instead of scanning every config.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::DbError;

use super::normalize::{normalize_fields, NormalizedField, ID_COLUMN};
use super::types::TableConfig;

/// Registered table with its normalized schema.
#[derive(Debug, Clone)]
pub struct RegisteredTable {
    pub config: TableConfig,
    pub fields: Vec<NormalizedField>,
}

impl RegisteredTable {
    /// Stored header row: `id` followed by the fields in canonical order.
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(ID_COLUMN.to_string())
            .chain(self.fields.iter().map(|f| f.name.clone()))
            .collect()
    }

    /// 1-based stored-column position of a field (`id` is column 1).
    pub fn column_position(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name == field)
            .map(|i| i + 2)
    }

    /// Normalized spec for a named field.
    pub fn field(&self, name: &str) -> Option<&NormalizedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Per-engine schema registry.
#[derive(Debug, Default)]
pub struct SchemaContext {
    /// Registered live tables by name
    tables: RwLock<HashMap<String, Arc<RegisteredTable>>>,
    /// Shadow schemas for history tables, keyed by history table name
    history: RwLock<HashMap<String, Arc<RegisteredTable>>>,
    /// Entity table -> junction tables that reference it
    junction_refs: RwLock<HashMap<String, Vec<String>>>,
}

impl SchemaContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a config exactly once; a duplicate is a conflict.
    pub fn register(&self, config: &TableConfig) -> Result<(), DbError> {
        let fields = normalize_fields(&config.table_name, &config.fields)?;

        let mut tables = self.tables.write();
        if tables.contains_key(&config.table_name) {
            return Err(DbError::TableAlreadyRegistered(config.table_name.clone()));
        }

        if let Some(junction) = &config.junction {
            let mut refs = self.junction_refs.write();
            for entity in [&junction.entity1_table, &junction.entity2_table] {
                let edges = refs.entry(entity.clone()).or_default();
                if !edges.contains(&config.table_name) {
                    edges.push(config.table_name.clone());
                }
            }
        }

        // History tables share the live layout; keeping a shadow schema lets
        // list reads decode archived rows without a separate registration.
        let registered = Arc::new(RegisteredTable {
            config: config.clone(),
            fields,
        });
        self.history
            .write()
            .insert(config.history_table_name.clone(), registered.clone());
        tables.insert(config.table_name.clone(), registered);
        Ok(())
    }

    /// True when the table has been registered.
    pub fn is_registered(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    /// Schema of a registered live table.
    pub fn get(&self, table: &str) -> Result<Arc<RegisteredTable>, DbError> {
        self.tables
            .read()
            .get(table)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound {
                table: table.to_string(),
            })
    }

    /// Schema for any readable sheet: a live table or a history table.
    pub fn schema_for_sheet(&self, sheet: &str) -> Result<Arc<RegisteredTable>, DbError> {
        if let Some(found) = self.tables.read().get(sheet) {
            return Ok(found.clone());
        }
        self.history
            .read()
            .get(sheet)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound {
                table: sheet.to_string(),
            })
    }

    /// Junction tables whose config references the given entity table.
    pub fn junctions_referencing(&self, entity_table: &str) -> Vec<Arc<RegisteredTable>> {
        let names = self
            .junction_refs
            .read()
            .get(entity_table)
            .cloned()
            .unwrap_or_default();
        let tables = self.tables.read();
        names
            .iter()
            .filter_map(|name| tables.get(name).cloned())
            .collect()
    }
}
