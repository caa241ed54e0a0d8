//! Engine configuration.

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Logical database identifier, used for log context
    pub database_name: String,
    /// Row capacity pre-allocated for each new sheet
    pub initial_table_capacity: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_name: "sheetdb".to_string(),
            initial_table_capacity: 1024,
        }
    }
}
