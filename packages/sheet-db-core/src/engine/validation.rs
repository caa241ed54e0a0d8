//! Key-order checking and per-field value resolution.
//!
//! Resolution is a pure function from (field spec, supplied value) to a typed
//! cell or a failure; the whole-row builder runs it over the canonical field
//! order and fails before any mutation touches the store.

use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::error::DbError;
use crate::sanitize::sanitize_cell_text;
use crate::schema::{DefaultValue, FieldType, NormalizedField, RegisteredTable, NOW_SENTINEL};
use crate::value::CellValue;

/// Resolution failure for a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No supplied value, no default
    MissingRequired,
    /// Supplied value does not satisfy the declared type
    InvalidType { expected: &'static str, got: String },
}

/// Applies the null/empty/default policy for one field.
///
/// `supplied` is `None` when the payload omitted the field entirely. A value
/// counts as missing when it is omitted, when it is null and the field treats
/// null as missing, or when it is an empty string and the field treats empty
/// strings as missing. An explicit null on a field without that treatment is
/// a type failure, never silently coerced.
pub fn resolve_value(
    field: &NormalizedField,
    supplied: Option<&Value>,
    now: OffsetDateTime,
) -> Result<CellValue, ResolveError> {
    match supplied {
        None => resolve_missing(field, now),
        Some(Value::Null) if field.treat_null_as_missing => resolve_missing(field, now),
        Some(Value::String(s)) if s.is_empty() && field.treat_empty_string_as_missing => {
            resolve_missing(field, now)
        }
        Some(value) => {
            CellValue::from_json(field.field_type, value).map_err(|got| ResolveError::InvalidType {
                expected: field.field_type.name(),
                got,
            })
        }
    }
}

fn resolve_missing(field: &NormalizedField, now: OffsetDateTime) -> Result<CellValue, ResolveError> {
    match &field.default {
        Some(default) => default_cell(field, default, now),
        None => Err(ResolveError::MissingRequired),
    }
}

/// Materializes a configured default, resolving the `"now"` sentinel at
/// write time. A default that does not fit its field type is a config defect
/// and surfaces as a type failure.
fn default_cell(
    field: &NormalizedField,
    default: &DefaultValue,
    now: OffsetDateTime,
) -> Result<CellValue, ResolveError> {
    match (field.field_type, default) {
        (FieldType::Date, DefaultValue::Text(s)) if s == NOW_SENTINEL => Ok(CellValue::Date(now)),
        (FieldType::Date, DefaultValue::Text(s)) => {
            CellValue::from_json(FieldType::Date, &Value::String(s.clone())).map_err(|got| {
                ResolveError::InvalidType {
                    expected: field.field_type.name(),
                    got,
                }
            })
        }
        (FieldType::String, DefaultValue::Text(s)) => Ok(CellValue::Text(s.clone())),
        (FieldType::Number, DefaultValue::Number(n)) => Ok(CellValue::Number(*n)),
        (FieldType::Boolean, DefaultValue::Bool(b)) => Ok(CellValue::Bool(*b)),
        (_, _) => Err(ResolveError::InvalidType {
            expected: field.field_type.name(),
            got: "mismatched default".to_string(),
        }),
    }
}

/// Ensures the caller-supplied key order covers every registered field.
pub fn check_key_order(table: &RegisteredTable, key_order: &[String]) -> Result<(), DbError> {
    let missing: Vec<String> = table
        .fields
        .iter()
        .map(|f| f.name.clone())
        .filter(|name| !key_order.iter().any(|key| key == name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DbError::IncompleteKeyOrder {
            table: table.config.table_name.clone(),
            missing,
        })
    }
}

/// Resolves a full payload into storage cells.
///
/// Applies defaults, type validation, and string sanitization over the
/// canonical field order; key-order entries naming unknown fields are
/// ignored, completeness is the only requirement. Fails before any mutation.
pub fn build_row(
    table: &RegisteredTable,
    payload: &Map<String, Value>,
    key_order: &[String],
    now: OffsetDateTime,
) -> Result<Vec<String>, DbError> {
    check_key_order(table, key_order)?;

    let mut missing = Vec::new();
    let mut cells = Vec::with_capacity(table.fields.len());
    for field in &table.fields {
        match resolve_value(field, payload.get(&field.name), now) {
            Ok(CellValue::Text(text)) => cells.push(sanitize_cell_text(&text)),
            Ok(cell) => cells.push(cell.encode()?),
            Err(ResolveError::MissingRequired) => missing.push(field.name.clone()),
            Err(ResolveError::InvalidType { expected, got }) => {
                return Err(DbError::InvalidType {
                    field: field.name.clone(),
                    expected: expected.to_string(),
                    got,
                });
            }
        }
    }

    if missing.is_empty() {
        Ok(cells)
    } else {
        Err(DbError::MissingRequiredFields {
            table: table.config.table_name.clone(),
            fields: missing,
        })
    }
}

/// Requires the payload to be a JSON object.
pub fn payload_object(data: &Value) -> Result<&Map<String, Value>, DbError> {
    data.as_object().ok_or_else(|| DbError::InvalidType {
        field: "payload".to_string(),
        expected: "object".to_string(),
        got: crate::value::json_type_name(data).to_string(),
    })
}
