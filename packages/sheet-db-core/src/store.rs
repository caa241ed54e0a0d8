//! Flat sheet-style backing store.
//!
//! Each sheet is a header row plus data rows of textual cells, addressed by
//! position. Column 1 is the surrogate `id`; ids come from a per-sheet
//! counter that starts at 1 and is never reused.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::DbError;
use crate::style::Palette;

/// One stored sheet.
#[derive(Debug)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    next_id: u64,
    pub palette: Option<Palette>,
}

impl Sheet {
    fn new(headers: Vec<String>, capacity: usize) -> Self {
        Self {
            headers,
            rows: Vec::with_capacity(capacity),
            next_id: 1,
            palette: None,
        }
    }

    /// Allocates the next record id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Next id that would be allocated, without allocating it.
    pub fn current_next_id(&self) -> u64 {
        self.next_id
    }

    /// Position of the row holding the given id.
    pub fn position_of(&self, id: u64) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.first().and_then(|cell| cell.parse::<u64>().ok()) == Some(id))
    }

    pub fn append_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn overwrite_row(&mut self, position: usize, cells: Vec<String>) {
        self.rows[position] = cells;
    }

    /// Removes and returns the row at the given position.
    pub fn delete_row(&mut self, position: usize) -> Vec<String> {
        self.rows.remove(position)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Container for every sheet in one database.
#[derive(Debug, Default)]
pub struct GridStore {
    sheets: RwLock<HashMap<String, Sheet>>,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the sheet if absent; existing data is left untouched.
    pub fn ensure_sheet(&self, name: &str, headers: &[String], capacity: usize) {
        let mut sheets = self.sheets.write();
        sheets
            .entry(name.to_string())
            .or_insert_with(|| Sheet::new(headers.to_vec(), capacity));
    }

    pub fn sheet_exists(&self, name: &str) -> bool {
        self.sheets.read().contains_key(name)
    }

    /// Runs a read-only closure against a sheet.
    pub fn with_sheet<R>(&self, name: &str, f: impl FnOnce(&Sheet) -> R) -> Result<R, DbError> {
        let sheets = self.sheets.read();
        let sheet = sheets
            .get(name)
            .ok_or_else(|| DbError::Storage(format!("sheet '{name}' does not exist")))?;
        Ok(f(sheet))
    }

    /// Runs a mutating closure against a sheet.
    pub fn with_sheet_mut<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Sheet) -> R,
    ) -> Result<R, DbError> {
        let mut sheets = self.sheets.write();
        let sheet = sheets
            .get_mut(name)
            .ok_or_else(|| DbError::Storage(format!("sheet '{name}' does not exist")))?;
        Ok(f(sheet))
    }
}
