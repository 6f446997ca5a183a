use std::fs;
use std::path::Path;
use std::sync::Arc;

use admin_cli::fixture::FixtureSource;
use admin_model::{AdminConfig, FieldMap};
use admin_schema::{ModelAdapter, TypeResolver};
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::{info, info_span};

use crate::cli::{FieldsArgs, TypesArgs};
use crate::types::TypeRow;

pub fn run_types(args: &TypesArgs) -> Result<Vec<TypeRow>> {
    let _span = info_span!("types", schemas = %args.schemas.display()).entered();
    let config = load_config(args.config.as_deref())?;
    let source = FixtureSource::from_schema_file(&args.schemas)?;

    if let Some(model) = &args.model
        && !source.schemas().contains_key(model)
    {
        bail!("model {model} not found in {}", args.schemas.display());
    }

    let mut rows = Vec::new();
    for (model, schema) in source.schemas() {
        if args.model.as_ref().is_some_and(|wanted| wanted != model) {
            continue;
        }
        let resolver = TypeResolver::for_schema(model, &schema.columns, config.model(model));
        rows.extend(schema.columns.iter().map(|column| TypeRow {
            model: model.clone(),
            column: column.name.clone(),
            storage_type: column.config.storage_type.clone(),
            field_type: resolver.identify(column),
        }));
    }
    info!(columns = rows.len(), "resolved column types");
    Ok(rows)
}

pub async fn run_fields(args: &FieldsArgs) -> Result<FieldMap> {
    let config = load_config(args.config.as_deref())?;
    let source = Arc::new(FixtureSource::from_dir(&args.fixture_dir)?.with_config(&config));
    let values = args.values.as_deref().map(load_values).transpose()?;

    let adapter = ModelAdapter::new(config, source.clone()).with_associations(source);
    let fields = adapter
        .form_fields(&args.model, values.as_ref())
        .await
        .with_context(|| format!("build form for {}", args.model))?;
    if fields.is_empty() {
        bail!("model {} has no schema", args.model);
    }
    Ok(fields)
}

pub async fn run_payload(args: &FieldsArgs) -> Result<Map<String, Value>> {
    Ok(run_fields(args).await?.update_payload())
}

fn load_config(path: Option<&Path>) -> Result<AdminConfig> {
    match path {
        Some(path) => AdminConfig::from_path(path)
            .with_context(|| format!("load admin config {}", path.display())),
        None => Ok(AdminConfig::default()),
    }
}

fn load_values(path: &Path) -> Result<Map<String, Value>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    match serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))? {
        Value::Object(values) => Ok(values),
        other => bail!(
            "{} must hold a JSON object, found {}",
            path.display(),
            kind(&other)
        ),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
