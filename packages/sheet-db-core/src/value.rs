//! Typed cell values.
//!
//! The backing store keeps every cell as text (the sheet convention). This
//! module owns the mapping between that storage form and the typed values
//! callers see: JSON in, text down to the store, typed JSON back out.

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::DbError;
use crate::schema::FieldType;

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A typed cell value ready to be written to, or restored from, a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(OffsetDateTime),
}

impl CellValue {
    /// Validates a supplied JSON value against the declared type.
    ///
    /// Returns a description of the offending shape on mismatch. An explicit
    /// JSON null is always a mismatch here; null-as-missing treatment happens
    /// in the resolver before this check.
    pub fn from_json(field_type: FieldType, value: &Value) -> Result<Self, String> {
        match (field_type, value) {
            (FieldType::String, Value::String(s)) => Ok(Self::Text(s.clone())),
            (FieldType::Number, Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Self::Number(f)),
                _ => Err("non-finite number".to_string()),
            },
            (FieldType::Boolean, Value::Bool(b)) => Ok(Self::Bool(*b)),
            (FieldType::Date, Value::String(s)) => parse_date_text(s)
                .ok_or_else(|| format!("string '{s}' is not a parseable date")),
            (FieldType::Date, Value::Number(n)) => n
                .as_i64()
                .and_then(date_from_unix_millis)
                .ok_or_else(|| "timestamp out of range".to_string()),
            (_, other) => Err(json_type_name(other).to_string()),
        }
    }

    /// Textual storage form of this value.
    pub fn encode(&self) -> Result<String, DbError> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Number(n) => Ok(format_number(*n)),
            Self::Bool(b) => Ok(b.to_string()),
            Self::Date(d) => d
                .format(&Rfc3339)
                .map_err(|e| DbError::Storage(format!("unformattable date: {e}"))),
        }
    }

    /// Restores the typed value from its storage form.
    pub fn decode(raw: &str, field_type: FieldType) -> Result<Self, DbError> {
        match field_type {
            FieldType::String => Ok(Self::Text(raw.to_string())),
            FieldType::Number => raw
                .parse::<f64>()
                .map(Self::Number)
                .map_err(|_| corrupt_cell(raw, field_type)),
            FieldType::Boolean => match raw {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(corrupt_cell(raw, field_type)),
            },
            FieldType::Date => OffsetDateTime::parse(raw, &Rfc3339)
                .map(Self::Date)
                .map_err(|_| corrupt_cell(raw, field_type)),
        }
    }

    /// JSON representation returned to callers.
    ///
    /// Integral numbers surface as JSON integers so round-trips compare
    /// cleanly; dates surface as RFC 3339 text.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
                    Value::from(*n as i64)
                } else {
                    Value::from(*n)
                }
            }
            Self::Bool(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(d.format(&Rfc3339).unwrap_or_default()),
        }
    }
}

/// Canonical decimal form: integral values drop the fraction.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// RFC 3339 first, then a plain `YYYY-MM-DD` interpreted as midnight UTC.
fn parse_date_text(s: &str) -> Option<CellValue> {
    if let Ok(parsed) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(CellValue::Date(parsed));
    }
    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(s, &date_only)
        .ok()
        .map(|d| CellValue::Date(d.midnight().assume_utc()))
}

/// Unix-millisecond timestamps; rejects values RFC 3339 cannot express.
fn date_from_unix_millis(millis: i64) -> Option<CellValue> {
    let parsed = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()?;
    if (0..=9999).contains(&parsed.year()) {
        Some(CellValue::Date(parsed))
    } else {
        None
    }
}

fn corrupt_cell(raw: &str, field_type: FieldType) -> DbError {
    DbError::Storage(format!(
        "cell '{raw}' is not a stored {}",
        field_type.name()
    ))
}

/// JSON shape name used in type-mismatch messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
