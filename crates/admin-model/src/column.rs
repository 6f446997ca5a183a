//! Raw column descriptors as received from the schema source.
//!
//! These types mirror the JSON shape the backend publishes for each model.
//! Everything is optional except the column name and storage type, and the
//! `info` bag carries free-form UI annotations.

use serde::{Deserialize, Deserializer, Serialize};

/// One column of a model as described by the schema source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    #[serde(default)]
    pub config: ColumnConfig,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, config: ColumnConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// Storage-level metadata for a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    /// Raw storage type, e.g. `VARCHAR(255)`, `INTEGER`, `DATETIME`.
    #[serde(rename = "type", default)]
    pub storage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<ColumnLength>,
    #[serde(default)]
    pub primary_key: bool,
    /// Target model name when this column is a foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<String>,
    #[serde(default)]
    pub many: bool,
    #[serde(default)]
    pub info: RawInfo,
}

impl ColumnConfig {
    pub fn typed(storage_type: impl Into<String>) -> Self {
        Self {
            storage_type: storage_type.into(),
            ..Self::default()
        }
    }
}

/// Column length as published by the server, either numeric or textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLength {
    Number(f64),
    Text(String),
}

impl ColumnLength {
    /// Numeric length, with `0` and unparseable text treated as absent.
    pub fn as_len(&self) -> Option<u32> {
        let parsed = match self {
            Self::Number(n) => *n,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        if parsed.is_finite() && parsed >= 1.0 {
            Some(parsed.min(f64::from(u32::MAX)) as u32)
        } else {
            None
        }
    }
}

/// Free-form UI annotation bag attached to a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInfo {
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Advanced UI type name, e.g. `EnumFilter` or `RichText`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Update-reference key when the UI name differs from the column name.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_data: Vec<EnumOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonEncoding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Readonly,
    Hidden,
}

/// How a JSON-typed field is stored on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonEncoding {
    /// Stored as a JSON-encoded string.
    #[serde(rename = "str")]
    Str,
}

/// One entry of an enum filter: the candidate field key and its choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    pub key: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub value: Vec<String>,
}

impl EnumOption {
    pub fn new(key: impl Into<String>, value: Vec<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

/// Schema of one model as returned by `load_origin_schema`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginSchema {
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub info: SchemaInfo,
}

impl OriginSchema {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self {
            columns,
            info: SchemaInfo::default(),
        }
    }

    /// Names of the columns flagged as primary keys.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.config.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}
