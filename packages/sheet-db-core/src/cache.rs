//! Optional read-through cache of per-table record snapshots.
//!
//! Slots publish immutable snapshots through `ArcSwapOption`, so cache hits
//! never contend with invalidation. The cache is a pure optimization: cached
//! and uncached reads must be observably equivalent at the data level.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::RwLock;
use serde_json::Value;

/// Decoded full record set for one table.
pub type CachedRows = Arc<Vec<Value>>;

/// Per-table read-through cache.
#[derive(Debug, Default)]
pub struct TableCache {
    slots: RwLock<HashMap<String, Arc<ArcSwapOption<Vec<Value>>>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, table: &str) -> Arc<ArcSwapOption<Vec<Value>>> {
        if let Some(slot) = self.slots.read().get(table) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(table.to_string())
            .or_default()
            .clone()
    }

    /// Last published snapshot for the table, if still valid.
    pub fn get(&self, table: &str) -> Option<CachedRows> {
        self.slots.read().get(table).and_then(|slot| slot.load_full())
    }

    /// Publishes a fresh snapshot after an uncached read.
    pub fn put(&self, table: &str, rows: Vec<Value>) -> CachedRows {
        let rows = Arc::new(rows);
        self.slot(table).store(Some(rows.clone()));
        rows
    }

    /// Drops the table's snapshot after a successful mutation.
    pub fn invalidate(&self, table: &str) {
        if let Some(slot) = self.slots.read().get(table) {
            slot.store(None);
        }
    }
}
