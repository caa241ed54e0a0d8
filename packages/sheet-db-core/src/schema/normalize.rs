//! Field normalization.
//!
//! Shorthand specs expand into the canonical form exactly once, at
//! registration; every downstream component sees only [`NormalizedField`]s.

use std::collections::HashSet;

use crate::error::DbError;

use super::types::{DefaultValue, FieldDef, FieldSpecInput, FieldType};

/// Reserved surrogate-key column, always stored first.
pub const ID_COLUMN: &str = "id";

/// Canonical per-field specification.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    pub name: String,
    pub field_type: FieldType,
    pub default: Option<DefaultValue>,
    pub treat_null_as_missing: bool,
    pub treat_empty_string_as_missing: bool,
}

/// Expands a config's field list into the canonical ordered form.
///
/// Rejects duplicate names and use of the reserved `id` column.
pub fn normalize_fields(table: &str, fields: &[FieldDef]) -> Result<Vec<NormalizedField>, DbError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(fields.len());

    for def in fields {
        if def.name == ID_COLUMN {
            return Err(DbError::ReservedFieldName(def.name.clone()));
        }
        if !seen.insert(def.name.as_str()) {
            return Err(DbError::FieldAlreadyExists {
                table: table.to_string(),
                field: def.name.clone(),
            });
        }
        out.push(match &def.spec {
            FieldSpecInput::Shorthand(field_type) => NormalizedField {
                name: def.name.clone(),
                field_type: *field_type,
                default: None,
                treat_null_as_missing: false,
                treat_empty_string_as_missing: false,
            },
            FieldSpecInput::Full(spec) => NormalizedField {
                name: def.name.clone(),
                field_type: spec.field_type,
                default: spec.default.clone(),
                treat_null_as_missing: spec.treat_null_as_missing,
                treat_empty_string_as_missing: spec.treat_empty_string_as_missing,
            },
        });
    }

    Ok(out)
}
