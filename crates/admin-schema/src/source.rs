//! Collaborator interfaces for schema and association data.

use std::collections::BTreeMap;

use admin_model::{AssociationQuery, Entity, OriginSchema, PagedResponse, RawColumn};
use async_trait::async_trait;
use serde_json::Value;

/// Supplies raw model schemas.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Schema of one model, `None` when the model is unknown.
    async fn load_origin_schema(&self, model_name: &str) -> anyhow::Result<Option<OriginSchema>>;

    /// Column lists of every known model.
    async fn load_schemas(&self) -> anyhow::Result<BTreeMap<String, Vec<RawColumn>>>;
}

/// Supplies records of associated models.
#[async_trait]
pub trait AssociationSource: Send + Sync {
    /// One page of candidate records, optionally filtered by keywords.
    async fn load_association(
        &self,
        model_name: &str,
        query: &AssociationQuery,
    ) -> anyhow::Result<PagedResponse<Entity>>;

    /// Records whose primary key is in `ids`.
    async fn load_association_by_ids(
        &self,
        model_name: &str,
        ids: &[Value],
        fields: &[String],
    ) -> anyhow::Result<PagedResponse<Entity>>;
}
