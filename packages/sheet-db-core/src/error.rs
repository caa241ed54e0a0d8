//! Engine error types.

use thiserror::Error;

/// Errors produced by engine operations.
///
/// Every variant maps to a canonical envelope status code via
/// [`DbError::status`]; failures are returned, never thrown across the
/// public boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// Table has not been registered in the schema context
    #[error("Table '{table}' not found in context")]
    TableNotFound { table: String },

    /// Duplicate registration of a table config
    #[error("Table '{0}' is already registered in context")]
    TableAlreadyRegistered(String),

    /// Row lookup by id failed
    #[error("Record {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: u64 },

    /// Caller-supplied key order does not cover every registered field
    #[error("Incomplete keyOrder for table '{table}': missing {missing:?}")]
    IncompleteKeyOrder { table: String, missing: Vec<String> },

    /// Required fields with no supplied value and no default
    #[error("Missing required fields in table '{table}': {fields:?}")]
    MissingRequiredFields { table: String, fields: Vec<String> },

    /// Supplied value does not match the declared field type
    #[error("Invalid type for field '{field}': expected {expected}, got {got}")]
    InvalidType {
        field: String,
        expected: String,
        got: String,
    },

    /// Field not present in the table schema
    #[error("Field '{field}' not found in table '{table}'")]
    FieldNotFound { table: String, field: String },

    /// Positional hint disagrees with the normalized schema order
    #[error("Field index {given} does not match column {expected} for field '{field}'")]
    FieldIndexMismatch {
        field: String,
        given: usize,
        expected: usize,
    },

    /// Duplicate field name within one table config
    #[error("Field '{field}' already exists in table '{table}'")]
    FieldAlreadyExists { table: String, field: String },

    /// Reserved column name used in a table config
    #[error("Field name '{0}' is reserved")]
    ReservedFieldName(String),

    /// Junction generation referenced an unregistered entity table
    #[error("Entity table '{table}' must be registered before generating a junction config")]
    EntityNotRegistered { table: String },

    /// Operation requires an engine-generated junction table
    #[error("Table '{table}' is not a junction table")]
    NotAJunctionTable { table: String },

    /// Unknown palette name
    #[error("Unknown color scheme '{0}'")]
    UnknownColorScheme(String),

    /// Backing-store sheet missing or malformed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DbError {
    /// Canonical envelope status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::TableNotFound { .. } | Self::RecordNotFound { .. } => 404,
            Self::IncompleteKeyOrder { .. }
            | Self::MissingRequiredFields { .. }
            | Self::InvalidType { .. }
            | Self::FieldNotFound { .. }
            | Self::FieldIndexMismatch { .. }
            | Self::FieldAlreadyExists { .. }
            | Self::ReservedFieldName(_)
            | Self::NotAJunctionTable { .. } => 400,
            Self::TableAlreadyRegistered(_)
            | Self::EntityNotRegistered { .. }
            | Self::UnknownColorScheme(_)
            | Self::Storage(_) => 500,
        }
    }
}
