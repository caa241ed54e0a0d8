//! Table and field configuration types.

use serde::{Deserialize, Serialize};

/// Declared field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

impl FieldType {
    /// Lowercase tag used in configs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

/// Sentinel for "current time at write" date defaults.
pub const NOW_SENTINEL: &str = "now";

/// Default value carried by a field spec.
///
/// Date defaults are expressed as text: the `"now"` sentinel or an RFC 3339
/// timestamp, interpreted at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Full field specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub treat_null_as_missing: bool,
    #[serde(default)]
    pub treat_empty_string_as_missing: bool,
}

impl FieldSpec {
    /// Spec with no default: the field is required.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            default: None,
            treat_null_as_missing: false,
            treat_empty_string_as_missing: false,
        }
    }

    /// Sets the default substituted when the value is missing.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Treats an explicit null as a missing value.
    pub fn null_as_missing(mut self) -> Self {
        self.treat_null_as_missing = true;
        self
    }

    /// Treats an empty string as a missing value.
    pub fn empty_string_as_missing(mut self) -> Self {
        self.treat_empty_string_as_missing = true;
        self
    }
}

/// Field spec as written in a config: bare type tag or full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpecInput {
    Shorthand(FieldType),
    Full(FieldSpec),
}

/// One named field, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub spec: FieldSpecInput,
}

impl FieldDef {
    /// Required field declared with the shorthand form.
    pub fn required(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            spec: FieldSpecInput::Shorthand(field_type),
        }
    }

    /// Fully specified field.
    pub fn with_spec(name: &str, spec: FieldSpec) -> Self {
        Self {
            name: name.to_string(),
            spec: FieldSpecInput::Full(spec),
        }
    }
}

/// Entity tables referenced by an engine-generated junction config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JunctionRefs {
    pub entity1_table: String,
    pub entity1_field: String,
    pub entity2_table: String,
    pub entity2_field: String,
}

/// Schema descriptor for one logical table.
///
/// Field order is the canonical column order; the engine prepends the
/// surrogate `id` column when the backing sheet is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub table_name: String,
    pub history_table_name: String,
    pub fields: Vec<FieldDef>,
    /// Present only on engine-generated junction configs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<JunctionRefs>,
}

impl TableConfig {
    pub fn new(table_name: &str, history_table_name: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            table_name: table_name.to_string(),
            history_table_name: history_table_name.to_string(),
            fields,
            junction: None,
        }
    }
}

/// Input to many-to-many junction generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManyToManyRequest {
    pub entity1_table_name: String,
    pub entity2_table_name: String,
    pub fields_related_to_both_entities: Vec<FieldDef>,
}
