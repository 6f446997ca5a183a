//! Orchestration of schema lookup, field building, and decoration.
//!
//! [`ModelAdapter`] is the entry point a form renderer talks to. It owns the
//! schema cache and the base field cache, both keyed by model name and
//! cleared only through [`ModelAdapter::invalidate`] or
//! [`ModelAdapter::sync_schemas`].

use std::sync::Arc;

use admin_model::{AdminConfig, Entity, FieldMap, OriginSchema, PagedResponse};
use serde_json::{Map, Value};
use tracing::{Instrument, debug, error, info, info_span};

use crate::association::AssociationResolver;
use crate::builder::FieldSchemaBuilder;
use crate::cache::SchemaCache;
use crate::error::{PipelineError, Result};
use crate::pipeline::{DecoratorPipeline, FieldContext, build_default_pipeline};
use crate::source::{AssociationSource, SchemaSource};

pub struct ModelAdapter {
    config: Arc<AdminConfig>,
    schemas: Arc<dyn SchemaSource>,
    resolver: Option<Arc<AssociationResolver>>,
    pipeline: DecoratorPipeline,
    schema_cache: SchemaCache<OriginSchema>,
    field_cache: SchemaCache<FieldMap>,
}

impl ModelAdapter {
    /// Adapter without an association source.
    ///
    /// Models with relational fields fail to decorate until
    /// [`with_associations`](Self::with_associations) is called.
    pub fn new(config: AdminConfig, schemas: Arc<dyn SchemaSource>) -> Self {
        let config = Arc::new(config);
        Self {
            pipeline: build_default_pipeline(Arc::clone(&config), None),
            config,
            schemas,
            resolver: None,
            schema_cache: SchemaCache::new(),
            field_cache: SchemaCache::new(),
        }
    }

    #[must_use]
    pub fn with_associations(mut self, source: Arc<dyn AssociationSource>) -> Self {
        let resolver = Arc::new(AssociationResolver::new(source, Arc::clone(&self.config)));
        self.pipeline = build_default_pipeline(Arc::clone(&self.config), Some(Arc::clone(&resolver)));
        self.resolver = Some(resolver);
        self
    }

    /// Replaces the decoration pipeline, e.g. to drop or add stages.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: DecoratorPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Stage names of the decoration pipeline in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.pipeline.step_names()
    }

    /// Raw schema of a model, `None` when the source does not know it.
    pub async fn schema(&self, model_name: &str) -> Result<Option<Arc<OriginSchema>>> {
        if let Some(schema) = self.schema_cache.get(model_name) {
            debug!(model = model_name, "schema cache hit");
            return Ok(Some(schema));
        }

        let loaded = self
            .schemas
            .load_origin_schema(model_name)
            .await
            .map_err(|source| PipelineError::Schema {
                model: model_name.to_string(),
                source,
            })?;
        Ok(loaded.map(|schema| self.schema_cache.insert(model_name, schema)))
    }

    /// Human-readable model name, falling back to the model name itself.
    pub async fn display_name(&self, model_name: &str) -> Result<String> {
        let schema = self.schema(model_name).await?;
        Ok(schema
            .and_then(|s| s.info.display_name.clone())
            .unwrap_or_else(|| model_name.to_string()))
    }

    /// Undecorated fields of a model without values.
    ///
    /// An unknown model yields an empty map, which is not cached.
    pub async fn base_fields(&self, model_name: &str) -> Result<Arc<FieldMap>> {
        if let Some(fields) = self.field_cache.get(model_name) {
            return Ok(fields);
        }
        let Some(schema) = self.schema(model_name).await? else {
            error!(model = model_name, "no schema for model");
            return Ok(Arc::new(FieldMap::new()));
        };

        let fields = FieldSchemaBuilder::new(&self.config).build(model_name, &schema.columns, None);
        Ok(self.field_cache.insert(model_name, fields))
    }

    /// Decorated form fields of a model, filled from `values` when given.
    ///
    /// An unknown model yields an empty map and an error log.
    pub async fn form_fields(
        &self,
        model_name: &str,
        values: Option<&Map<String, Value>>,
    ) -> Result<FieldMap> {
        let fields = match values {
            None => FieldMap::clone(&*self.base_fields(model_name).await?),
            Some(values) => {
                let Some(schema) = self.schema(model_name).await? else {
                    error!(model = model_name, "no schema for model");
                    return Ok(FieldMap::new());
                };
                FieldSchemaBuilder::new(&self.config).build(model_name, &schema.columns, Some(values))
            }
        };
        if fields.is_empty() {
            return Ok(fields);
        }
        self.decorate(model_name, fields).await
    }

    /// Runs the pipeline again over a map the renderer has edited.
    ///
    /// Stages that track `raw` leave already-processed values alone, and
    /// associations whose selection count is unchanged are not refetched.
    pub async fn redecorate(&self, model_name: &str, fields: FieldMap) -> Result<FieldMap> {
        self.decorate(model_name, fields).await
    }

    /// One page of candidates of a target model matching `keywords`.
    pub async fn search(
        &self,
        model_name: &str,
        keywords: &str,
        page: u32,
    ) -> Result<PagedResponse<Entity>> {
        let Some(resolver) = &self.resolver else {
            return Err(PipelineError::SearchUnavailable {
                model: model_name.to_string(),
            });
        };
        resolver.search(model_name, keywords, page).await
    }

    /// Reloads every schema from the source, replacing both caches.
    ///
    /// Returns the number of models loaded.
    pub async fn sync_schemas(&self) -> Result<usize> {
        let schemas = self
            .schemas
            .load_schemas()
            .await
            .map_err(|source| PipelineError::Schema {
                model: "*".to_string(),
                source,
            })?;

        self.invalidate(None);
        let count = schemas.len();
        for (model_name, columns) in schemas {
            self.schema_cache.insert(model_name, OriginSchema::new(columns));
        }
        info!(models = count, "schemas synchronized");
        Ok(count)
    }

    /// Drops cached schemas and fields of one model, or of all models.
    pub fn invalidate(&self, model_name: Option<&str>) {
        debug!(model = model_name.unwrap_or("*"), "invalidating schema caches");
        self.schema_cache.invalidate(model_name);
        self.field_cache.invalidate(model_name);
    }

    async fn decorate(&self, model_name: &str, fields: FieldMap) -> Result<FieldMap> {
        let span = info_span!("decorate", model = model_name, fields = fields.len());
        let ctx = self
            .pipeline
            .run(FieldContext::new(model_name, fields))
            .instrument(span)
            .await?;
        Ok(ctx.fields)
    }
}
