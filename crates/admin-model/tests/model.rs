use std::fs;

use admin_model::{
    AdminConfig, ColumnLength, FieldDescriptor, FieldMap, FieldSettings, FieldOptions, FieldType,
    JsonEncoding, ModelError, NameCasing, OriginSchema,
};
use serde_json::{Value, json};

#[test]
fn parses_raw_schema_from_server_shape() {
    let schema: OriginSchema = serde_json::from_value(json!({
        "columns": [
            {"name": "id", "config": {"type": "INTEGER", "primaryKey": true}},
            {"name": "title", "config": {"type": "VARCHAR(255)", "nullable": true, "length": "255",
                "info": {"name": "Title", "help": "Shown in lists"}}},
            {"name": "tags", "config": {"type": "", "many": true, "selectable": "t_tags"}},
            {"name": "meta", "config": {"type": "TEXT", "info": {"json": "str", "ref": "metaRef"}}}
        ],
        "info": {"displayName": "Posts"}
    }))
    .unwrap();

    assert_eq!(schema.columns.len(), 4);
    assert_eq!(schema.primary_keys(), vec!["id"]);
    assert_eq!(schema.info.display_name.as_deref(), Some("Posts"));

    let title = &schema.columns[1];
    assert_eq!(title.config.nullable, Some(true));
    assert_eq!(
        title.config.length,
        Some(ColumnLength::Text("255".to_string()))
    );
    assert_eq!(title.config.info.name.as_deref(), Some("Title"));

    let tags = &schema.columns[2];
    assert!(tags.config.many);
    assert_eq!(tags.config.selectable.as_deref(), Some("t_tags"));

    let meta = &schema.columns[3];
    assert_eq!(meta.config.info.json, Some(JsonEncoding::Str));
    assert_eq!(meta.config.info.reference.as_deref(), Some("metaRef"));
}

#[test]
fn field_type_round_trips_through_names() {
    assert_eq!("JSON".parse::<FieldType>().unwrap(), FieldType::Json);
    assert_eq!(
        "EnumFilter".parse::<FieldType>().unwrap(),
        FieldType::EnumFilter
    );
    assert_eq!(
        "Markdown".parse::<FieldType>().unwrap(),
        FieldType::Unidentified("Markdown".to_string())
    );
    assert_eq!(
        serde_json::to_value(FieldType::ManyToMany).unwrap(),
        json!("ManyToMany")
    );
}

#[test]
fn undefined_and_null_values_stay_distinct() {
    let fields: FieldMap = serde_json::from_value(json!({
        "title": {"name": "title", "ref": "title", "type": "Input", "value": null},
        "body": {"name": "body", "ref": "body", "type": "TextArea"}
    }))
    .unwrap();

    assert_eq!(fields.get("title").unwrap().value, Some(Value::Null));
    assert_eq!(fields.get("body").unwrap().value, None);

    let payload = fields.update_payload();
    assert_eq!(payload.get("title"), Some(&Value::Null));
    assert!(!payload.contains_key("body"));

    let serialized = serde_json::to_value(&fields).unwrap();
    assert!(serialized["title"].get("value").is_some());
    assert!(serialized["body"].get("value").is_none());
}

#[test]
fn update_payload_uses_reference_keys() {
    let mut field = FieldDescriptor::new("authorName", Some(FieldType::Input))
        .with_value(json!("Ada"));
    field.reference = "author_name".to_string();

    let mut fields = FieldMap::new();
    fields.insert("authorName", field);

    let payload = fields.update_payload();
    assert_eq!(payload.get("author_name"), Some(&json!("Ada")));
}

#[test]
fn settings_override_only_what_they_define() {
    let mut options = FieldOptions {
        label: Some("Schema label".to_string()),
        required: true,
        ..FieldOptions::default()
    };
    let settings: FieldSettings =
        serde_json::from_value(json!({"required": false, "placeholder": "Type here"})).unwrap();

    settings.apply(&mut options);

    assert_eq!(options.label.as_deref(), Some("Schema label"));
    assert!(!options.required);
    assert_eq!(options.extra.get("placeholder"), Some(&json!("Type here")));
}

#[test]
fn loads_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin.json");
    fs::write(
        &path,
        r#"{
            "casing": "snake",
            "models": {
                "t_posts": {
                    "settings": {"title": {"label": "Headline"}},
                    "associations": {"author": {"name": "nickname", "value": "id", "fields": ["id", "nickname"]}}
                }
            }
        }"#,
    )
    .unwrap();

    let config = AdminConfig::from_path(&path).unwrap();
    assert_eq!(config.casing, NameCasing::Snake);
    assert_eq!(config.page_size, admin_model::DEFAULT_PAGE_SIZE);

    let posts = config.model("t_posts").unwrap();
    assert_eq!(
        posts.settings.get("title").unwrap().label.as_deref(),
        Some("Headline")
    );
    assert_eq!(posts.associations.get("author").unwrap().name, "nickname");
}

#[test]
fn missing_config_file_reports_path() {
    let err = AdminConfig::from_path("/nonexistent/admin.json").unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/admin.json"));
}

#[test]
fn registered_editor_is_kept_out_of_serialization() {
    let config = AdminConfig::default().with_editor("t_posts", "body", |_| FieldType::RichText);
    let posts = config.model("t_posts").unwrap();
    let editor = posts.editor("body").unwrap();
    assert_eq!(editor(&FieldMap::new()), FieldType::RichText);

    let serialized = serde_json::to_value(&config).unwrap();
    assert!(serialized["models"]["t_posts"].get("editors").is_none());
}
