use std::sync::Arc;

use admin_model::{
    AdminConfig, AssociationBundle, Entity, FieldDescriptor, FieldType, ForeignOption,
};
use async_trait::async_trait;
use futures_util::future;
use serde_json::Value;
use tracing::{debug, warn};

use crate::association::{AssociationResolver, association_config, extract_ids};
use crate::error::{PipelineError, Result};
use crate::pipeline::{AsyncDecorator, FieldContext};

/// Loads candidate pages and selected records for relational fields.
///
/// All fields are resolved concurrently and written back together. A field
/// whose lookup fails degrades to a plain `Input`; the other fields are
/// unaffected.
pub struct LoadAssociationsDecorator {
    resolver: Option<Arc<AssociationResolver>>,
}

impl LoadAssociationsDecorator {
    pub fn new(resolver: Option<Arc<AssociationResolver>>) -> Self {
        Self { resolver }
    }
}

/// Data fetched for one field.
struct Loaded {
    target_model: String,
    ids: Vec<Value>,
    items: Vec<Entity>,
    exist_items: Vec<Entity>,
}

#[async_trait]
impl AsyncDecorator for LoadAssociationsDecorator {
    async fn decorate(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        let targets: Vec<String> = ctx
            .fields
            .iter()
            .filter(|(_, field)| needs_loading(field))
            .map(|(key, _)| key.clone())
            .collect();
        let Some(first) = targets.first() else {
            return Ok(ctx);
        };
        let Some(resolver) = &self.resolver else {
            return Err(PipelineError::MissingAssociationSource {
                model: ctx.model_name.clone(),
                field: first.clone(),
            });
        };

        let mut pending = Vec::with_capacity(targets.len());
        let mut unselectable = Vec::new();
        for key in targets {
            let Some(field) = ctx.fields.get(&key) else {
                continue;
            };
            let Some(target_model) = field.options.selectable.clone() else {
                unselectable.push(key);
                continue;
            };

            let ids = field
                .value
                .as_ref()
                .map(|value| extract_ids(value, &resolver.id_field(&target_model)))
                .unwrap_or_default();
            let fields = resolver
                .association_config(&ctx.model_name, &field.column, &key, &target_model)
                .map(|config| config.fields)
                .unwrap_or_default();

            // Queued before anything is awaited: by-ids requests of every
            // field share one batch.
            let candidates = resolver.load_candidates(&target_model);
            let existing = resolver.load_existing(&target_model, &ids, &fields);
            pending.push(async move {
                let (candidates, existing) = future::join(candidates, existing).await;
                let loaded = match (candidates, existing) {
                    (Ok(page), Ok(exist_items)) => Ok(Loaded {
                        target_model,
                        ids,
                        items: page.list,
                        exist_items,
                    }),
                    (Err(err), _) => Err(err),
                    (_, Err(err)) => Err(anyhow::Error::new(err)),
                };
                (key, loaded)
            });
        }

        let results = future::join_all(pending).await;

        for key in unselectable {
            if let Some(field) = ctx.fields.get_mut(&key) {
                warn!(model = %ctx.model_name, field = %key, "association field has no target model, using Input");
                degrade(field);
            }
        }
        for (key, loaded) in results {
            let Some(field) = ctx.fields.get_mut(&key) else {
                continue;
            };
            match loaded {
                Ok(loaded) => {
                    debug!(
                        model = %ctx.model_name,
                        field = %key,
                        target_model = %loaded.target_model,
                        items = loaded.items.len(),
                        exist_items = loaded.exist_items.len(),
                        "association loaded"
                    );
                    attach(field, loaded);
                }
                Err(err) => {
                    warn!(model = %ctx.model_name, field = %key, error = %err, "association lookup failed, using Input");
                    degrade(field);
                }
            }
        }
        Ok(ctx)
    }

    fn step_name(&self) -> &str {
        "load_associations"
    }
}

/// Relational fields whose selected records are not loaded yet.
///
/// A field is considered loaded when it carries a bundle holding as many
/// selected records as its value has ids. Changing ids without changing the
/// count is not detected.
fn needs_loading(field: &FieldDescriptor) -> bool {
    let relational = field
        .field_type
        .as_ref()
        .is_some_and(FieldType::is_association);
    relational
        && !field
            .associations
            .as_ref()
            .is_some_and(|bundle| bundle.exist_items.len() == field.value_len())
}

fn attach(field: &mut FieldDescriptor, loaded: Loaded) {
    let many = field.field_type == Some(FieldType::ManyToMany);
    if field.value.as_ref().is_some_and(|value| !value.is_null()) {
        field.value = Some(if many {
            Value::Array(loaded.ids)
        } else {
            loaded.ids.into_iter().next().unwrap_or(Value::Null)
        });
    }
    field.associations = Some(AssociationBundle {
        items: loaded.items,
        exist_items: loaded.exist_items,
        foreign_opts: vec![ForeignOption::new(loaded.target_model)],
    });
}

fn degrade(field: &mut FieldDescriptor) {
    field.field_type = Some(FieldType::Input);
    field.associations = None;
}

/// Fills in the display config of option lists that lack one.
pub struct AssociationConfigDecorator {
    config: Arc<AdminConfig>,
}

impl AssociationConfigDecorator {
    pub fn new(config: Arc<AdminConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AsyncDecorator for AssociationConfigDecorator {
    async fn decorate(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        let model_name = ctx.model_name.clone();
        for (key, field) in ctx.fields.iter_mut() {
            let column = field.column.clone();
            let Some(bundle) = field.associations.as_mut() else {
                continue;
            };
            for option in bundle
                .foreign_opts
                .iter_mut()
                .filter(|option| option.association.is_none())
            {
                option.association =
                    association_config(&self.config, &model_name, &column, key, &option.model_name);
                if option.association.is_none() {
                    warn!(model = %model_name, field = %key, target_model = %option.model_name, "no association config");
                }
            }
        }
        Ok(ctx)
    }

    fn step_name(&self) -> &str {
        "association_config"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn relational(field_type: FieldType, value: Option<Value>) -> FieldDescriptor {
        let mut field = FieldDescriptor::new("tags", Some(field_type));
        field.value = value;
        field
    }

    #[test]
    fn loaded_bundle_with_matching_count_is_skipped() {
        let mut field = relational(FieldType::ManyToMany, Some(json!([1, 2])));
        assert!(needs_loading(&field));

        field.associations = Some(AssociationBundle {
            exist_items: vec![json!({"id": 1}), json!({"id": 2})],
            ..AssociationBundle::default()
        });
        assert!(!needs_loading(&field));

        field.value = Some(json!([1, 2, 3]));
        assert!(needs_loading(&field));
    }

    #[test]
    fn non_relational_fields_are_never_loaded() {
        assert!(!needs_loading(&relational(FieldType::Input, Some(json!(1)))));
        assert!(!needs_loading(&FieldDescriptor::new("untyped", None)));
    }

    #[test]
    fn attach_rewrites_value_to_bare_ids() {
        let mut single = relational(FieldType::Association, Some(json!({"id": 5, "name": "x"})));
        attach(
            &mut single,
            Loaded {
                target_model: "t_users".into(),
                ids: vec![json!(5)],
                items: Vec::new(),
                exist_items: vec![json!({"id": 5})],
            },
        );
        assert_eq!(single.value, Some(json!(5)));
        let bundle = single.associations.unwrap();
        assert_eq!(bundle.foreign_opts, vec![ForeignOption::new("t_users")]);

        let mut undefined = relational(FieldType::ManyToMany, None);
        attach(
            &mut undefined,
            Loaded {
                target_model: "t_tags".into(),
                ids: Vec::new(),
                items: vec![json!({"id": 1})],
                exist_items: Vec::new(),
            },
        );
        assert_eq!(undefined.value, None);
    }
}
