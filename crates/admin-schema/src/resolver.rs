//! Field type inference from raw column descriptors.
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. **Plain key** - primary keys and `created_at`/`updated_at`
//! 2. **Association** - columns with a `selectable` target model
//! 3. **Advanced type** - a known type named by `info.type`
//! 4. **Basic type** - pattern match on the storage type
//! 5. **Fallback** - the raw type string, verbatim

use admin_model::{FieldType, ModelConfig, RawColumn, same_key};
use tracing::warn;

const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Infers UI field types for the columns of one model.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    model_name: String,
    primary_keys: Vec<String>,
}

impl TypeResolver {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            primary_keys: Vec::new(),
        }
    }

    /// Resolver for a model, taking primary keys from flagged columns and
    /// from the model configuration.
    pub fn for_schema(
        model_name: impl Into<String>,
        columns: &[RawColumn],
        config: Option<&ModelConfig>,
    ) -> Self {
        let mut resolver = Self::new(model_name);
        for column in columns.iter().filter(|c| c.config.primary_key) {
            resolver = resolver.with_primary_key(&column.name);
        }
        if let Some(key) = config.and_then(|c| c.primary_key.as_deref()) {
            resolver = resolver.with_primary_key(key);
        }
        resolver
    }

    #[must_use]
    pub fn with_primary_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.primary_keys.iter().any(|k| same_key(k, &key)) {
            self.primary_keys.push(key);
        }
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// True when `name` is a primary key of this model, in any casing.
    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_keys.iter().any(|k| same_key(k, name))
    }

    /// True for primary keys and creation/update timestamps.
    pub fn is_plain_key(&self, name: &str) -> bool {
        self.is_primary_key(name) || TIMESTAMP_COLUMNS.iter().any(|t| same_key(t, name))
    }

    /// Resolves the field type of `column`.
    ///
    /// Returns `None` only when no rule matched and the column carries no
    /// type string at all.
    pub fn identify(&self, column: &RawColumn) -> Option<FieldType> {
        let config = &column.config;

        if config.primary_key || self.is_plain_key(&column.name) {
            return Some(FieldType::Plain);
        }

        if config.selectable.is_some() {
            return Some(if config.many {
                FieldType::ManyToMany
            } else {
                FieldType::Association
            });
        }

        let advanced = config
            .info
            .field_type
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        if let Some(name) = advanced {
            if let Some(field_type) = FieldType::advanced(name) {
                return Some(field_type);
            }
            warn!(
                model = %self.model_name,
                column = %column.name,
                advanced_type = name,
                "unknown advanced field type"
            );
            return Some(FieldType::Unidentified(name.to_string()));
        }

        if let Some(field_type) = basic_type(&config.storage_type) {
            return Some(field_type);
        }

        let raw = config.storage_type.trim();
        warn!(
            model = %self.model_name,
            column = %column.name,
            storage_type = raw,
            "unidentified field type"
        );
        if raw.is_empty() {
            None
        } else {
            Some(FieldType::Unidentified(raw.to_string()))
        }
    }
}

/// Resolves one column without any primary-key knowledge beyond the column
/// itself.
pub fn identify_type(model_name: &str, column: &RawColumn) -> Option<FieldType> {
    TypeResolver::new(model_name).identify(column)
}

/// Maps a storage type to its basic widget, ignoring case and any
/// parenthesized size suffix.
pub fn basic_type(storage_type: &str) -> Option<FieldType> {
    let upper = storage_type.trim().to_uppercase();
    let base = upper.split('(').next().unwrap_or_default().trim();
    if base.is_empty() {
        return None;
    }

    let field_type = match base {
        "STRING" => FieldType::Input,
        "FLOAT" | "NUMBER" | "NUMERIC" | "DECIMAL" => FieldType::InputNumber,
        "TEXT" => FieldType::TextArea,
        "DATETIME" => FieldType::DateTime,
        "DATE" => FieldType::Date,
        "BOOLEAN" => FieldType::Switch,
        "JSON" => FieldType::Json,
        other if other.starts_with("VARCHAR") => FieldType::Input,
        other if other.starts_with("INT") || other.starts_with("DOUBLE") => {
            FieldType::InputNumber
        }
        _ => return None,
    };
    Some(field_type)
}
