//! JSON fixture directories standing in for the schema and record services.
//!
//! A fixture directory holds:
//!
//! ```text
//! fixtures/
//! ├── schemas.json    # { model: OriginSchema | RawColumn[] }
//! └── entities.json   # { model: Entity[] } (optional)
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use admin_model::{AdminConfig, AssociationQuery, Entity, OriginSchema, PagedResponse, RawColumn};
use admin_schema::{AssociationSource, DEFAULT_ID_FIELD, SchemaSource, id_key};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const SCHEMAS_FILE: &str = "schemas.json";
pub const ENTITIES_FILE: &str = "entities.json";

/// A model's schema, either with display info or as a bare column list.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaEntry {
    Full(OriginSchema),
    Columns(Vec<RawColumn>),
}

impl From<SchemaEntry> for OriginSchema {
    fn from(entry: SchemaEntry) -> Self {
        match entry {
            SchemaEntry::Full(schema) => schema,
            SchemaEntry::Columns(columns) => OriginSchema::new(columns),
        }
    }
}

/// Schemas and records read from fixture files.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    schemas: BTreeMap<String, OriginSchema>,
    entities: BTreeMap<String, Vec<Entity>>,
    id_fields: BTreeMap<String, String>,
}

impl FixtureSource {
    /// Loads `schemas.json` and, when present, `entities.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut source = Self::from_schema_file(&dir.join(SCHEMAS_FILE))?;
        let entities_path = dir.join(ENTITIES_FILE);
        if entities_path.exists() {
            source.entities = read_json(&entities_path)?;
        }
        debug!(
            models = source.schemas.len(),
            entity_models = source.entities.len(),
            "loaded fixtures"
        );
        Ok(source)
    }

    /// Loads schemas only.
    pub fn from_schema_file(path: &Path) -> Result<Self> {
        let entries: BTreeMap<String, SchemaEntry> = read_json(path)?;
        Ok(Self {
            schemas: entries
                .into_iter()
                .map(|(model, entry)| (model, entry.into()))
                .collect(),
            entities: BTreeMap::new(),
            id_fields: BTreeMap::new(),
        })
    }

    /// Matches records of each model on its configured primary key.
    #[must_use]
    pub fn with_config(mut self, config: &AdminConfig) -> Self {
        self.id_fields = config
            .models
            .iter()
            .filter_map(|(model, model_config)| {
                model_config
                    .primary_key
                    .clone()
                    .map(|key| (model.clone(), key))
            })
            .collect();
        self
    }

    /// Field holding the record id of a model.
    pub fn id_field(&self, model_name: &str) -> &str {
        self.id_fields
            .get(model_name)
            .map_or(DEFAULT_ID_FIELD, String::as_str)
    }

    pub fn schemas(&self) -> &BTreeMap<String, OriginSchema> {
        &self.schemas
    }

    pub fn entities(&self, model_name: &str) -> &[Entity] {
        self.entities.get(model_name).map(Vec::as_slice).unwrap_or_default()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))
}

/// True when any string or number in the record contains `keywords`,
/// ignoring case.
fn matches_keywords(record: &Value, keywords: &str) -> bool {
    match record {
        Value::String(text) => text.to_lowercase().contains(keywords),
        Value::Number(number) => number.to_string().contains(keywords),
        Value::Array(items) => items.iter().any(|item| matches_keywords(item, keywords)),
        Value::Object(fields) => fields.values().any(|field| matches_keywords(field, keywords)),
        Value::Null | Value::Bool(_) => false,
    }
}

#[async_trait]
impl SchemaSource for FixtureSource {
    async fn load_origin_schema(&self, model_name: &str) -> Result<Option<OriginSchema>> {
        Ok(self.schemas.get(model_name).cloned())
    }

    async fn load_schemas(&self) -> Result<BTreeMap<String, Vec<RawColumn>>> {
        Ok(self
            .schemas
            .iter()
            .map(|(model, schema)| (model.clone(), schema.columns.clone()))
            .collect())
    }
}

#[async_trait]
impl AssociationSource for FixtureSource {
    async fn load_association(
        &self,
        model_name: &str,
        query: &AssociationQuery,
    ) -> Result<PagedResponse<Entity>> {
        if !self.entities.contains_key(model_name) {
            bail!("no fixture records for {model_name}");
        }
        let keywords = query.keywords.as_deref().map(str::to_lowercase);
        let matching: Vec<&Entity> = self
            .entities(model_name)
            .iter()
            .filter(|record| {
                keywords
                    .as_deref()
                    .is_none_or(|keywords| matches_keywords(record, keywords))
            })
            .collect();

        let page_size = query.page_size.unwrap_or(admin_model::DEFAULT_PAGE_SIZE) as usize;
        let skip = (query.page.max(1) as usize - 1) * page_size;
        Ok(PagedResponse {
            total: Some(matching.len() as u64),
            list: matching
                .into_iter()
                .skip(skip)
                .take(page_size)
                .cloned()
                .collect(),
            page: Some(query.page),
            page_size: query.page_size,
        })
    }

    async fn load_association_by_ids(
        &self,
        model_name: &str,
        ids: &[Value],
        fields: &[String],
    ) -> Result<PagedResponse<Entity>> {
        if !self.entities.contains_key(model_name) {
            bail!("no fixture records for {model_name}");
        }
        let wanted: Vec<String> = ids.iter().filter_map(id_key).collect();
        let id_field = self.id_field(model_name);
        let list = self
            .entities(model_name)
            .iter()
            .filter(|record| {
                record
                    .get(id_field)
                    .and_then(id_key)
                    .is_some_and(|id| wanted.contains(&id))
            })
            .map(|record| project(record, fields))
            .collect();
        Ok(PagedResponse::from_list(list))
    }
}

/// Keeps only `fields` of a record; an empty list keeps everything.
fn project(record: &Entity, fields: &[String]) -> Entity {
    match record {
        Value::Object(map) if !fields.is_empty() => Value::Object(
            map.iter()
                .filter(|(key, _)| fields.contains(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keyword_match_is_case_insensitive_and_nested() {
        let record = json!({"id": 7, "profile": {"nickname": "Ada"}});
        assert!(matches_keywords(&record, "ada"));
        assert!(matches_keywords(&record, "7"));
        assert!(!matches_keywords(&record, "bob"));
    }

    #[test]
    fn projection_keeps_requested_fields() {
        let record = json!({"id": 1, "nickname": "ada", "email": "a@example.com"});
        let fields = vec!["id".to_string(), "nickname".to_string()];
        assert_eq!(project(&record, &fields), json!({"id": 1, "nickname": "ada"}));
        assert_eq!(project(&record, &[]), record);
    }
}
