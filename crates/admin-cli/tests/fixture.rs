//! Running the pipeline against fixture directories.

use std::fs;
use std::sync::Arc;

use admin_cli::fixture::{ENTITIES_FILE, FixtureSource, SCHEMAS_FILE};
use admin_model::{AdminConfig, AssociationQuery, FieldType, ModelConfig};
use admin_schema::{AssociationSource, ModelAdapter, SchemaSource};
use serde_json::json;
use tempfile::TempDir;

fn write_fixtures(schemas: &serde_json::Value, entities: Option<&serde_json::Value>) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(SCHEMAS_FILE), schemas.to_string()).unwrap();
    if let Some(entities) = entities {
        fs::write(dir.path().join(ENTITIES_FILE), entities.to_string()).unwrap();
    }
    dir
}

fn schemas() -> serde_json::Value {
    json!({
        "t_posts": {
            "columns": [
                {"name": "id", "config": {"type": "INTEGER", "primaryKey": true}},
                {"name": "title", "config": {"type": "VARCHAR(255)", "nullable": false}},
                {"name": "author_id", "config": {"type": "INTEGER", "selectable": "t_users"}}
            ],
            "info": {"displayName": "Posts"}
        },
        "t_users": [
            {"name": "id", "config": {"type": "INTEGER", "primaryKey": true}},
            {"name": "nickname", "config": {"type": "STRING"}}
        ]
    })
}

fn entities() -> serde_json::Value {
    json!({
        "t_users": [
            {"id": 1, "nickname": "Ada", "email": "ada@example.com"},
            {"id": 2, "nickname": "Brian", "email": "brian@example.com"}
        ]
    })
}

#[tokio::test]
async fn test_schema_forms_are_both_accepted() {
    let dir = write_fixtures(&schemas(), None);
    let source = FixtureSource::from_dir(dir.path()).unwrap();

    let posts = source.load_origin_schema("t_posts").await.unwrap().unwrap();
    assert_eq!(posts.info.display_name.as_deref(), Some("Posts"));
    assert_eq!(posts.columns.len(), 3);

    let users = source.load_origin_schema("t_users").await.unwrap().unwrap();
    assert_eq!(users.info.display_name, None);
    assert_eq!(users.primary_keys(), vec!["id"]);

    assert!(source.load_origin_schema("t_tags").await.unwrap().is_none());
    assert_eq!(source.load_schemas().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_records_page_and_filter_by_keyword() {
    let dir = write_fixtures(&schemas(), Some(&entities()));
    let source = FixtureSource::from_dir(dir.path()).unwrap();

    let query = AssociationQuery::search("BRI", 1);
    let page = source.load_association("t_users", &query).await.unwrap();
    assert_eq!(page.total, Some(1));
    assert_eq!(page.list[0]["nickname"], json!("Brian"));

    let fields = vec!["id".to_string(), "nickname".to_string()];
    let found = source
        .load_association_by_ids("t_users", &[json!("1")], &fields)
        .await
        .unwrap();
    assert_eq!(found.list, vec![json!({"id": 1, "nickname": "Ada"})]);

    assert!(
        source
            .load_association("t_posts", &AssociationQuery::first_page())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_adapter_builds_form_from_fixtures() {
    let dir = write_fixtures(&schemas(), Some(&entities()));
    let source = Arc::new(FixtureSource::from_dir(dir.path()).unwrap());
    let adapter = ModelAdapter::new(AdminConfig::default(), source.clone()).with_associations(source);
    let values = json!({"id": 5, "title": "Hi", "author_id": 2});

    let fields = adapter
        .form_fields("t_posts", values.as_object())
        .await
        .unwrap();

    let author = fields.get("authorId").unwrap();
    assert_eq!(author.field_type, Some(FieldType::Association));
    let bundle = author.associations.as_ref().unwrap();
    assert_eq!(bundle.items.len(), 2);
    assert_eq!(bundle.exist_items.len(), 1);
    assert_eq!(bundle.exist_items[0]["id"], json!(2));
    assert_eq!(fields.update_payload().get("authorId"), Some(&json!(2)));
}

#[tokio::test]
async fn test_records_match_on_configured_primary_key() {
    let entities = json!({
        "t_users": [
            {"uid": "u1", "nickname": "Ada"},
            {"uid": "u2", "nickname": "Brian"}
        ]
    });
    let dir = write_fixtures(&schemas(), Some(&entities));
    let config = AdminConfig::default().with_model(
        "t_users",
        ModelConfig {
            primary_key: Some("uid".to_string()),
            ..ModelConfig::default()
        },
    );
    let source = Arc::new(FixtureSource::from_dir(dir.path()).unwrap().with_config(&config));
    assert_eq!(source.id_field("t_users"), "uid");
    assert_eq!(source.id_field("t_posts"), "id");

    let adapter = ModelAdapter::new(config, source.clone()).with_associations(source);
    let values = json!({"id": 5, "title": "Hi", "author_id": "u2"});
    let fields = adapter
        .form_fields("t_posts", values.as_object())
        .await
        .unwrap();

    let author = fields.get("authorId").unwrap();
    assert_eq!(author.value, Some(json!("u2")));
    assert_eq!(
        author.associations.as_ref().unwrap().exist_items,
        vec![json!({"uid": "u2", "nickname": "Brian"})]
    );
}

#[test]
fn test_missing_schema_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = FixtureSource::from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains(SCHEMAS_FILE));
}
