//! Resolution of relational field values into option lists.
//!
//! Lookups of already-selected records go through one [`BatchLoader`] per
//! target model, so every association field resolved in the same pass shares
//! a single by-ids request per target model.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use admin_batch::{BatchError, BatchLoader};
use admin_model::{AdminConfig, AssociationConfig, AssociationQuery, Entity, PagedResponse};
use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::source::AssociationSource;

/// Primary key field assumed when a model does not configure one.
pub const DEFAULT_ID_FIELD: &str = "id";

type ExistLoader = BatchLoader<Value, Vec<Entity>>;

/// Loads candidate pages and selected records for association fields.
pub struct AssociationResolver {
    source: Arc<dyn AssociationSource>,
    config: Arc<AdminConfig>,
    loaders: Mutex<BTreeMap<String, ExistLoader>>,
}

impl AssociationResolver {
    pub fn new(source: Arc<dyn AssociationSource>, config: Arc<AdminConfig>) -> Self {
        Self {
            source,
            config,
            loaders: Mutex::new(BTreeMap::new()),
        }
    }

    /// Primary key field of a target model.
    pub fn id_field(&self, model_name: &str) -> String {
        self.config
            .model(model_name)
            .and_then(|c| c.primary_key.clone())
            .unwrap_or_else(|| DEFAULT_ID_FIELD.to_string())
    }

    /// Display config for the options of one association field.
    pub fn association_config(
        &self,
        owner_model: &str,
        column: &str,
        field_key: &str,
        target_model: &str,
    ) -> Option<AssociationConfig> {
        association_config(&self.config, owner_model, column, field_key, target_model)
    }

    /// First page of candidates for a target model.
    pub fn load_candidates(
        &self,
        model_name: &str,
    ) -> impl Future<Output = anyhow::Result<PagedResponse<Entity>>> + Send + 'static {
        let query = AssociationQuery::first_page().with_page_size(self.config.page_size);
        self.query(model_name, query)
    }

    /// Keyword search over a target model, backing the renderer's search box.
    pub async fn search(
        &self,
        model_name: &str,
        keywords: &str,
        page: u32,
    ) -> Result<PagedResponse<Entity>> {
        let query = AssociationQuery::search(keywords, page).with_page_size(self.config.page_size);
        self.query(model_name, query)
            .await
            .map_err(|source| PipelineError::Search {
                model: model_name.to_string(),
                source,
            })
    }

    fn query(
        &self,
        model_name: &str,
        query: AssociationQuery,
    ) -> impl Future<Output = anyhow::Result<PagedResponse<Entity>>> + Send + 'static {
        let source = Arc::clone(&self.source);
        let model_name = model_name.to_string();
        async move { source.load_association(&model_name, &query).await }
    }

    /// Records of `model_name` whose primary key is in `ids`.
    ///
    /// Every id is queued on the model's batch loader before this returns,
    /// so lookups created together share one request.
    pub fn load_existing(
        &self,
        model_name: &str,
        ids: &[Value],
        fields: &[String],
    ) -> BoxFuture<'static, std::result::Result<Vec<Entity>, BatchError>> {
        if ids.is_empty() {
            return future::ready(Ok(Vec::new())).boxed();
        }
        let loader = self.loader(model_name, fields);
        let pending: Vec<_> = ids.iter().map(|id| loader.load(id.clone())).collect();

        async move {
            let mut found = Vec::new();
            for entities in future::join_all(pending).await {
                found.extend(entities?);
            }
            Ok::<_, BatchError>(found)
        }
        .boxed()
    }

    fn loader(&self, model_name: &str, fields: &[String]) -> ExistLoader {
        let cache_key = format!("{model_name}|{}", fields.join(","));
        let mut loaders = lock(&self.loaders);
        if let Some(loader) = loaders.get(&cache_key) {
            return loader.clone();
        }

        let loader = self.new_loader(model_name, fields);
        loaders.insert(cache_key, loader.clone());
        loader
    }

    fn new_loader(&self, model_name: &str, fields: &[String]) -> ExistLoader {
        let source = Arc::clone(&self.source);
        let model = model_name.to_string();
        let fields = fields.to_vec();
        let id_field = self.id_field(model_name);

        BatchLoader::new(move |ids: Vec<Value>| {
            let source = Arc::clone(&source);
            let model = model.clone();
            let fields = fields.clone();
            async move {
                let ids = dedupe_ids(ids);
                debug!(model = %model, ids = ids.len(), "loading associated records by id");
                let page = source.load_association_by_ids(&model, &ids, &fields).await?;
                Ok::<_, anyhow::Error>(page.list)
            }
        })
        .with_extractor(move |entities: &Vec<Entity>, id: &Value| {
            let wanted = id_key(id);
            entities
                .iter()
                .filter(|entity| {
                    wanted.is_some()
                        && entity.get(&id_field).and_then(id_key) == wanted
                })
                .cloned()
                .collect()
        })
    }
}

/// Display config for one association field.
///
/// Looked up on the owning model by column name, then by field key, then on
/// the target model under its own name.
pub fn association_config(
    config: &AdminConfig,
    owner_model: &str,
    column: &str,
    field_key: &str,
    target_model: &str,
) -> Option<AssociationConfig> {
    let owned = config.model(owner_model).and_then(|owner| {
        owner
            .associations
            .get(column)
            .or_else(|| owner.associations.get(field_key))
    });
    owned
        .or_else(|| {
            config
                .model(target_model)
                .and_then(|target| target.associations.get(target_model))
        })
        .cloned()
}

/// Ids referenced by a field value.
///
/// Accepts a bare id, an embedded record, or an array of either; records
/// contribute their `id_field`.
pub fn extract_ids(value: &Value, id_field: &str) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .flat_map(|item| extract_ids(item, id_field))
            .collect(),
        Value::Object(record) => record
            .get(id_field)
            .filter(|id| !id.is_null())
            .cloned()
            .into_iter()
            .collect(),
        other => vec![other.clone()],
    }
}

/// Comparison key for an id, so `1` and `"1"` name the same record.
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn dedupe_ids(ids: Vec<Value>) -> Vec<Value> {
    let mut seen = BTreeSet::new();
    ids.into_iter()
        .filter(|id| id_key(id).is_some_and(|key| seen.insert(key)))
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
