//! Model-level configuration supplied by the hosting application.
//!
//! The serializable part (`settings`, `associations`, `primaryKey`) is read
//! from a JSON file at startup. Custom editors are closures and can only be
//! registered in code.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::Accessibility;
use crate::error::{ModelError, Result};
use crate::field::{FieldMap, FieldOptions, FieldType};

/// Default number of candidate records fetched per association page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Casing applied to field names exposed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCasing {
    #[default]
    Camel,
    Snake,
    Preserve,
}

/// Partial field options applied over schema-derived defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FieldSettings {
    /// Overwrites every option this settings block defines.
    pub fn apply(&self, options: &mut FieldOptions) {
        if let Some(label) = &self.label {
            options.label = Some(label.clone());
        }
        if let Some(length) = self.length {
            options.length = Some(length);
        }
        if let Some(required) = self.required {
            options.required = required;
        }
        if let Some(hidden) = self.hidden {
            options.hidden = hidden;
        }
        if let Some(accessible) = self.accessible {
            options.accessible = Some(accessible);
        }
        if let Some(filter_type) = &self.filter_type {
            options.filter_type = Some(filter_type.clone());
        }
        if let Some(help) = &self.help {
            options.help = Some(help.clone());
        }
        if let Some(field_type) = &self.field_type {
            options.field_type = Some(field_type.clone());
        }
        for (key, value) in &self.extra {
            options.extra.insert(key.clone(), value.clone());
        }
    }
}

/// How records of a target model are displayed in option lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationConfig {
    /// Field used as the option label.
    pub name: String,
    /// Field used as the option value.
    pub value: String,
    /// Fields to request when loading records by id.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Decides a field's type from the whole field map at decoration time.
pub type CustomEditor = Arc<dyn Fn(&FieldMap) -> FieldType + Send + Sync>;

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Primary key column, when the schema does not flag one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    /// Per-column overrides keyed by raw column name.
    #[serde(default)]
    pub settings: BTreeMap<String, FieldSettings>,
    #[serde(default)]
    pub associations: BTreeMap<String, AssociationConfig>,
    /// Per-column type overrides keyed by raw column name.
    #[serde(skip)]
    pub editors: BTreeMap<String, CustomEditor>,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("primary_key", &self.primary_key)
            .field("settings", &self.settings)
            .field("associations", &self.associations)
            .field("editors", &self.editors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModelConfig {
    pub fn editor(&self, column: &str) -> Option<&CustomEditor> {
        self.editors.get(column)
    }
}

/// Application-wide configuration for the schema pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    #[serde(default)]
    pub casing: NameCasing,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            casing: NameCasing::default(),
            page_size: DEFAULT_PAGE_SIZE,
            models: BTreeMap::new(),
        }
    }
}

impl AdminConfig {
    /// Loads configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ModelError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn model(&self, model_name: &str) -> Option<&ModelConfig> {
        self.models.get(model_name)
    }

    #[must_use]
    pub fn with_casing(mut self, casing: NameCasing) -> Self {
        self.casing = casing;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model_name: impl Into<String>, config: ModelConfig) -> Self {
        self.models.insert(model_name.into(), config);
        self
    }

    /// Registers a custom editor for one column of a model.
    #[must_use]
    pub fn with_editor<F>(mut self, model_name: &str, column: &str, editor: F) -> Self
    where
        F: Fn(&FieldMap) -> FieldType + Send + Sync + 'static,
    {
        self.models
            .entry(model_name.to_string())
            .or_default()
            .editors
            .insert(column.to_string(), Arc::new(editor));
        self
    }
}
