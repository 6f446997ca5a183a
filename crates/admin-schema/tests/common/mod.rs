//! In-memory schema and record source shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use admin_model::{
    AssociationQuery, ColumnConfig, Entity, FieldDescriptor, FieldOptions, FieldType,
    OriginSchema, PagedResponse, RawColumn,
};
use admin_schema::{AssociationSource, SchemaSource, id_key};
use anyhow::bail;
use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Default)]
pub struct MemorySource {
    pub schemas: BTreeMap<String, OriginSchema>,
    pub records: BTreeMap<String, Vec<Entity>>,
    pub failing: BTreeSet<String>,
    pub schema_loads: AtomicUsize,
    pub page_loads: AtomicUsize,
    pub by_ids_calls: Mutex<Vec<(String, Vec<Value>, Vec<String>)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, model_name: &str, schema: OriginSchema) -> Self {
        self.schemas.insert(model_name.to_string(), schema);
        self
    }

    pub fn with_records(mut self, model_name: &str, records: Vec<Entity>) -> Self {
        self.records.insert(model_name.to_string(), records);
        self
    }

    pub fn failing(mut self, model_name: &str) -> Self {
        self.failing.insert(model_name.to_string());
        self
    }

    pub fn schema_loads(&self) -> usize {
        self.schema_loads.load(Ordering::SeqCst)
    }

    pub fn page_loads(&self) -> usize {
        self.page_loads.load(Ordering::SeqCst)
    }

    /// By-ids requests issued for one model.
    pub fn by_ids_for(&self, model_name: &str) -> Vec<Vec<Value>> {
        self.by_ids_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(model, _, _)| model == model_name)
            .map(|(_, ids, _)| ids.clone())
            .collect()
    }
}

#[async_trait]
impl SchemaSource for MemorySource {
    async fn load_origin_schema(&self, model_name: &str) -> anyhow::Result<Option<OriginSchema>> {
        self.schema_loads.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(model_name) {
            bail!("schema service unavailable");
        }
        Ok(self.schemas.get(model_name).cloned())
    }

    async fn load_schemas(&self) -> anyhow::Result<BTreeMap<String, Vec<RawColumn>>> {
        Ok(self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.columns.clone()))
            .collect())
    }
}

#[async_trait]
impl AssociationSource for MemorySource {
    async fn load_association(
        &self,
        model_name: &str,
        query: &AssociationQuery,
    ) -> anyhow::Result<PagedResponse<Entity>> {
        self.page_loads.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(model_name) {
            bail!("records of {model_name} unavailable");
        }
        let matching: Vec<Entity> = self
            .records
            .get(model_name)
            .into_iter()
            .flatten()
            .filter(|record| match &query.keywords {
                Some(keywords) => record.to_string().contains(keywords.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        let page_size = query.page_size.unwrap_or(20) as usize;
        let skip = (query.page.max(1) as usize - 1) * page_size;
        Ok(PagedResponse {
            total: Some(matching.len() as u64),
            list: matching.into_iter().skip(skip).take(page_size).collect(),
            page: Some(query.page),
            page_size: query.page_size,
        })
    }

    async fn load_association_by_ids(
        &self,
        model_name: &str,
        ids: &[Value],
        fields: &[String],
    ) -> anyhow::Result<PagedResponse<Entity>> {
        self.by_ids_calls.lock().unwrap().push((
            model_name.to_string(),
            ids.to_vec(),
            fields.to_vec(),
        ));
        if self.failing.contains(model_name) {
            bail!("records of {model_name} unavailable");
        }
        let wanted: BTreeSet<String> = ids.iter().filter_map(id_key).collect();
        let list = self
            .records
            .get(model_name)
            .into_iter()
            .flatten()
            .filter(|record| {
                record
                    .get("id")
                    .and_then(id_key)
                    .is_some_and(|id| wanted.contains(&id))
            })
            .cloned()
            .collect();
        Ok(PagedResponse::from_list(list))
    }
}

pub fn column(name: &str, config: serde_json::Value) -> RawColumn {
    RawColumn::new(name, serde_json::from_value::<ColumnConfig>(config).unwrap())
}

/// A relational field pointing at `target`.
pub fn relation(key: &str, field_type: FieldType, target: &str, value: Option<Value>) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(key, Some(field_type)).with_options(FieldOptions {
        selectable: Some(target.to_string()),
        ..FieldOptions::default()
    });
    field.value = value;
    field
}

pub fn users() -> Vec<Entity> {
    vec![
        json!({"id": 1, "nickname": "ada"}),
        json!({"id": 2, "nickname": "brian"}),
        json!({"id": 3, "nickname": "carol"}),
    ]
}

pub fn tags() -> Vec<Entity> {
    vec![json!({"id": 10, "label": "rust"}), json!({"id": 11, "label": "async"})]
}

/// Posts with a primary key, timestamps, a title, and an author.
pub fn posts_schema() -> OriginSchema {
    let mut schema = OriginSchema::new(vec![
        column("id", json!({"type": "INTEGER", "primaryKey": true})),
        column("title", json!({"type": "VARCHAR(255)", "info": {"name": "Title"}})),
        column("body", json!({"type": "TEXT", "nullable": true})),
        column("created_at", json!({"type": "DATETIME"})),
        column("updated_at", json!({"type": "DATETIME"})),
        column("author_id", json!({"type": "INTEGER", "selectable": "t_users"})),
    ]);
    schema.info.display_name = Some("Posts".to_string());
    schema
}
