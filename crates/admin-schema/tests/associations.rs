//! Association loading against an in-memory record source.

mod common;

use std::sync::Arc;

use admin_model::{AdminConfig, AssociationConfig, FieldMap, FieldType, ModelConfig};
use admin_schema::decorators::{AssociationConfigDecorator, LoadAssociationsDecorator};
use admin_schema::{AssociationResolver, AsyncDecorator, FieldContext, PipelineError};
use common::{MemorySource, relation, tags, users};
use serde_json::json;

fn resolver_for(source: &Arc<MemorySource>, config: AdminConfig) -> Arc<AssociationResolver> {
    let source: Arc<MemorySource> = Arc::clone(source);
    Arc::new(AssociationResolver::new(source, Arc::new(config)))
}

async fn load(resolver: &Arc<AssociationResolver>, fields: FieldMap) -> FieldMap {
    LoadAssociationsDecorator::new(Some(Arc::clone(resolver)))
        .decorate(FieldContext::new("t_posts", fields))
        .await
        .unwrap()
        .fields
}

fn post_fields() -> FieldMap {
    [
        relation("author", FieldType::Association, "t_users", Some(json!(1))),
        relation("reviewers", FieldType::ManyToMany, "t_users", Some(json!([2, {"id": 3}]))),
        relation("tags", FieldType::ManyToMany, "t_tags", Some(json!([10]))),
    ]
    .into_iter()
    .map(|field| (field.name.clone(), field))
    .collect()
}

#[tokio::test]
async fn test_fields_share_one_by_ids_call_per_target_model() {
    let source = Arc::new(
        MemorySource::new()
            .with_records("t_users", users())
            .with_records("t_tags", tags()),
    );
    let resolver = resolver_for(&source, AdminConfig::default());

    let fields = load(&resolver, post_fields()).await;

    assert_eq!(source.by_ids_for("t_users"), vec![vec![json!(1), json!(2), json!(3)]]);
    assert_eq!(source.by_ids_for("t_tags"), vec![vec![json!(10)]]);

    let author = fields.get("author").unwrap();
    assert_eq!(author.value, Some(json!(1)));
    let bundle = author.associations.as_ref().unwrap();
    assert_eq!(bundle.exist_items, vec![json!({"id": 1, "nickname": "ada"})]);
    assert_eq!(bundle.items.len(), 3);
    assert_eq!(bundle.foreign_opts[0].model_name, "t_users");

    let reviewers = fields.get("reviewers").unwrap();
    assert_eq!(reviewers.value, Some(json!([2, 3])));
    assert_eq!(reviewers.associations.as_ref().unwrap().exist_items.len(), 2);
}

#[tokio::test]
async fn test_failed_lookup_degrades_only_that_field() {
    let source = Arc::new(
        MemorySource::new()
            .with_records("t_users", users())
            .failing("t_tags"),
    );
    let resolver = resolver_for(&source, AdminConfig::default());

    let fields = load(&resolver, post_fields()).await;

    let tags = fields.get("tags").unwrap();
    assert_eq!(tags.field_type, Some(FieldType::Input));
    assert!(tags.associations.is_none());
    assert_eq!(tags.value, Some(json!([10])));

    let author = fields.get("author").unwrap();
    assert_eq!(author.field_type, Some(FieldType::Association));
    assert!(author.associations.is_some());
}

#[tokio::test]
async fn test_field_without_target_model_degrades() {
    let source = Arc::new(MemorySource::new());
    let resolver = resolver_for(&source, AdminConfig::default());
    let mut field = relation("owner", FieldType::Association, "t_users", Some(json!(1)));
    field.options.selectable = None;
    let fields: FieldMap = [("owner".to_string(), field)].into_iter().collect();

    let fields = load(&resolver, fields).await;

    assert_eq!(fields.get("owner").unwrap().field_type, Some(FieldType::Input));
    assert_eq!(source.page_loads(), 0);
}

#[tokio::test]
async fn test_loaded_fields_are_not_refetched() {
    let source = Arc::new(
        MemorySource::new()
            .with_records("t_users", users())
            .with_records("t_tags", tags()),
    );
    let resolver = resolver_for(&source, AdminConfig::default());

    let first = load(&resolver, post_fields()).await;
    let page_loads = source.page_loads();
    let second = load(&resolver, first.clone()).await;

    assert_eq!(first, second);
    assert_eq!(source.page_loads(), page_loads);
    assert_eq!(source.by_ids_for("t_users").len(), 1);

    let mut edited = second;
    edited.get_mut("reviewers").unwrap().value = Some(json!([1, 2, 3]));
    let third = load(&resolver, edited).await;
    assert_eq!(source.by_ids_for("t_users").len(), 2);
    let reviewers = third.get("reviewers").unwrap();
    assert_eq!(reviewers.associations.as_ref().unwrap().exist_items.len(), 3);
}

#[tokio::test]
async fn test_undefined_value_loads_candidates_only() {
    let source = Arc::new(MemorySource::new().with_records("t_tags", tags()));
    let resolver = resolver_for(&source, AdminConfig::default());
    let fields: FieldMap = [(
        "tags".to_string(),
        relation("tags", FieldType::ManyToMany, "t_tags", None),
    )]
    .into_iter()
    .collect();

    let fields = load(&resolver, fields).await;

    let tags = fields.get("tags").unwrap();
    assert_eq!(tags.value, None);
    assert_eq!(tags.associations.as_ref().unwrap().items.len(), 2);
    assert!(source.by_ids_for("t_tags").is_empty());
}

#[tokio::test]
async fn test_null_value_stays_null() {
    let source = Arc::new(
        MemorySource::new()
            .with_records("t_users", users())
            .with_records("t_tags", tags()),
    );
    let resolver = resolver_for(&source, AdminConfig::default());
    let fields: FieldMap = [
        relation("tags", FieldType::ManyToMany, "t_tags", Some(json!(null))),
        relation("author", FieldType::Association, "t_users", Some(json!(null))),
    ]
    .into_iter()
    .map(|field| (field.name.clone(), field))
    .collect();

    let fields = load(&resolver, fields).await;

    for key in ["tags", "author"] {
        let field = fields.get(key).unwrap();
        assert_eq!(field.value, Some(json!(null)), "field {key}");
        assert!(field.associations.as_ref().unwrap().exist_items.is_empty());
    }
    assert!(source.by_ids_for("t_tags").is_empty());
}

#[tokio::test]
async fn test_missing_association_source_is_fatal() {
    let decorator = LoadAssociationsDecorator::new(None);

    let err = decorator
        .decorate(FieldContext::new("t_posts", post_fields()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingAssociationSource { ref model, ref field }
            if model == "t_posts" && field == "author"
    ));

    let plain: FieldMap = FieldMap::new();
    assert!(decorator.decorate(FieldContext::new("t_posts", plain)).await.is_ok());
}

#[tokio::test]
async fn test_association_config_is_backfilled_and_drives_requested_fields() {
    let author_display = AssociationConfig {
        name: "nickname".to_string(),
        value: "id".to_string(),
        fields: vec!["id".to_string(), "nickname".to_string()],
    };
    let mut posts = ModelConfig::default();
    posts
        .associations
        .insert("author".to_string(), author_display.clone());
    let config = AdminConfig::default().with_model("t_posts", posts);

    let source = Arc::new(
        MemorySource::new()
            .with_records("t_users", users())
            .with_records("t_tags", tags()),
    );
    let resolver = resolver_for(&source, config.clone());

    let loaded = load(&resolver, post_fields()).await;
    let ctx = AssociationConfigDecorator::new(Arc::new(config))
        .decorate(FieldContext::new("t_posts", loaded))
        .await
        .unwrap();

    let author = ctx.fields.get("author").unwrap();
    let option = &author.associations.as_ref().unwrap().foreign_opts[0];
    assert_eq!(option.association, Some(author_display));

    let tags = ctx.fields.get("tags").unwrap();
    assert_eq!(tags.associations.as_ref().unwrap().foreign_opts[0].association, None);

    let calls = source.by_ids_calls.lock().unwrap();
    let author_fields: Vec<_> = calls
        .iter()
        .filter(|(model, _, fields)| model == "t_users" && !fields.is_empty())
        .collect();
    assert_eq!(author_fields.len(), 1);
    assert_eq!(author_fields[0].1, vec![json!(1)]);
}

#[tokio::test]
async fn test_search_filters_and_pages_candidates() {
    let source = Arc::new(MemorySource::new().with_records("t_users", users()));
    let resolver = resolver_for(&source, AdminConfig::default());

    let page = resolver.search("t_users", "carol", 1).await.unwrap();
    assert_eq!(page.list, vec![json!({"id": 3, "nickname": "carol"})]);
    assert_eq!(page.total, Some(1));

    let failing = Arc::new(MemorySource::new().failing("t_users"));
    let err = resolver_for(&failing, AdminConfig::default())
        .search("t_users", "", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Search { .. }));
}
