//! UI-ready field descriptors produced by the schema pipeline.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::column::{Accessibility, EnumOption, JsonEncoding};
use crate::config::AssociationConfig;

/// A record returned by the association source.
pub type Entity = Value;

/// Widget type a field renders with.
///
/// Serialized as the plain type name the renderer expects. Names that no
/// rule recognizes are kept verbatim in [`FieldType::Unidentified`] so the
/// renderer can still attempt a generic input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Non-editable display field (primary keys, timestamps).
    Plain,
    Association,
    ManyToMany,
    EnumFilter,
    SortPosition,
    RichText,
    Image,
    File,
    Input,
    InputNumber,
    TextArea,
    DateTime,
    Date,
    Switch,
    Json,
    Unidentified(String),
}

impl FieldType {
    /// Advanced types that may be named through `info.type`.
    pub const ADVANCED: [FieldType; 5] = [
        FieldType::EnumFilter,
        FieldType::SortPosition,
        FieldType::RichText,
        FieldType::Image,
        FieldType::File,
    ];

    /// Looks up a known advanced type by name.
    pub fn advanced(name: &str) -> Option<FieldType> {
        Self::ADVANCED
            .iter()
            .find(|t| t.as_str() == name.trim())
            .cloned()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "Plain",
            Self::Association => "Association",
            Self::ManyToMany => "ManyToMany",
            Self::EnumFilter => "EnumFilter",
            Self::SortPosition => "SortPosition",
            Self::RichText => "RichText",
            Self::Image => "Image",
            Self::File => "File",
            Self::Input => "Input",
            Self::InputNumber => "InputNumber",
            Self::TextArea => "TextArea",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Switch => "Switch",
            Self::Json => "JSON",
            Self::Unidentified(raw) => raw,
        }
    }

    /// True for foreign-key and many-to-many fields.
    pub fn is_association(&self) -> bool {
        matches!(self, Self::Association | Self::ManyToMany)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl FieldType {
    fn from_name(name: &str) -> Self {
        match name {
            "Plain" => Self::Plain,
            "Association" => Self::Association,
            "ManyToMany" => Self::ManyToMany,
            "Input" => Self::Input,
            "InputNumber" => Self::InputNumber,
            "TextArea" => Self::TextArea,
            "DateTime" => Self::DateTime,
            "Date" => Self::Date,
            "Switch" => Self::Switch,
            "JSON" => Self::Json,
            other => {
                Self::advanced(other).unwrap_or_else(|| Self::Unidentified(other.to_string()))
            }
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

/// Per-field rendering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonEncoding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_data: Vec<EnumOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Advanced type name copied from the raw `info.type`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Model-level overrides with no dedicated slot.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Option list driving a searchable dropdown for one target model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignOption {
    pub model_name: String,
    #[serde(default)]
    pub association: Option<AssociationConfig>,
}

impl ForeignOption {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            association: None,
        }
    }
}

/// Relational data attached to an association field by the async stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationBundle {
    /// Current searchable candidate page.
    #[serde(default)]
    pub items: Vec<Entity>,
    /// Records for already-selected values that may be missing from `items`.
    #[serde(default)]
    pub exist_items: Vec<Entity>,
    #[serde(default)]
    pub foreign_opts: Vec<ForeignOption>,
}

/// One form field.
///
/// `value` is `None` when undefined ("don't touch" on update) and
/// `Some(Value::Null)` when explicitly cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "ref", default)]
    pub reference: String,
    /// Raw column name this field was built from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub column: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Original unparsed value kept across passes.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw: Option<Value>,
    #[serde(default)]
    pub options: FieldOptions,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_filter_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<AssociationBundle>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: Option<FieldType>) -> Self {
        let name = name.into();
        Self {
            reference: name.clone(),
            column: name.clone(),
            name,
            field_type,
            value: None,
            raw: None,
            options: FieldOptions::default(),
            is_filter_field: false,
            associations: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// True when the value is undefined or null.
    pub fn value_is_nil(&self) -> bool {
        matches!(self.value, None | Some(Value::Null))
    }

    /// Number of selected items: array length, 0 for nil, 1 otherwise.
    pub fn value_len(&self) -> usize {
        match &self.value {
            None | Some(Value::Null) => 0,
            Some(Value::Array(items)) => items.len(),
            Some(_) => 1,
        }
    }

    /// True when the resolved type or the advanced type name matches.
    pub fn is_type(&self, field_type: &FieldType) -> bool {
        self.field_type.as_ref() == Some(field_type)
            || self.options.field_type.as_deref() == Some(field_type.as_str())
    }
}

/// Field descriptors keyed by UI field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldDescriptor>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldDescriptor> {
        self.0.get_mut(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        field: FieldDescriptor,
    ) -> Option<FieldDescriptor> {
        self.0.insert(key.into(), field)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldDescriptor> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldDescriptor)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut FieldDescriptor)> {
        self.0.iter_mut()
    }

    pub fn retain(&mut self, keep: impl FnMut(&String, &mut FieldDescriptor) -> bool) {
        self.0.retain(keep);
    }

    /// Keys of fields of the given type, in key order.
    pub fn keys_of_type(&self, field_type: &FieldType) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, field)| field.is_type(field_type))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Values keyed by update reference, omitting undefined fields.
    pub fn update_payload(&self) -> Map<String, Value> {
        self.0
            .values()
            .filter_map(|field| {
                field
                    .value
                    .as_ref()
                    .map(|value| (field.reference.clone(), value.clone()))
            })
            .collect()
    }
}

impl FromIterator<(String, FieldDescriptor)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldDescriptor)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, FieldDescriptor);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Deserializes a present key (including `null`) as `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
