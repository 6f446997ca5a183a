use admin_model::{FieldType, same_key};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::{Decorator, FieldContext};

/// Keeps only the relation an `EnumFilter` field currently selects.
///
/// The enum field's `enumData` keys name the candidate fields and its value
/// names the selected one. The selected field is flagged as the filter
/// field and every other candidate is dropped. A `SortPosition` field
/// without `raw` is seeded from the selected field's value; once `raw` is
/// set it is trusted on later passes.
///
/// Only one enum filter per model is supported. When several exist the
/// first by key is used.
pub struct EnumFilterDecorator;

impl Decorator for EnumFilterDecorator {
    fn decorate(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        let enum_keys = ctx.fields.keys_of_type(&FieldType::EnumFilter);
        let Some(enum_key) = enum_keys.first().cloned() else {
            return Ok(ctx);
        };
        if enum_keys.len() > 1 {
            warn!(
                model = %ctx.model_name,
                fields = ?enum_keys,
                "multiple enum filter fields, using the first"
            );
        }

        let Some(enum_field) = ctx.fields.get_mut(&enum_key) else {
            return Ok(ctx);
        };
        let candidates: Vec<String> = enum_field
            .options
            .enum_data
            .iter()
            .map(|option| option.key.clone())
            .collect();
        let filter_type = enum_field.options.filter_type.clone();
        let current = match &enum_field.value {
            Some(Value::String(key)) if !key.trim().is_empty() => Some(key.clone()),
            _ => None,
        };
        let selected = match current {
            Some(key) => key,
            None => {
                let Some(first) = candidates.first() else {
                    return Ok(ctx);
                };
                debug!(model = %ctx.model_name, selected = %first, "defaulting enum filter selection");
                enum_field.value = Some(Value::String(first.clone()));
                first.clone()
            }
        };

        let target_key = ctx
            .fields
            .iter()
            .find(|(key, field)| same_key(key, &selected) || same_key(&field.column, &selected))
            .map(|(key, _)| key.clone());

        ctx.fields.retain(|key, field| {
            if *key == enum_key || Some(key) == target_key.as_ref() {
                return true;
            }
            !candidates
                .iter()
                .any(|c| same_key(c, key) || same_key(c, &field.column))
        });

        let Some(target_key) = target_key else {
            warn!(
                model = %ctx.model_name,
                selected = %selected,
                "enum filter selects a field that does not exist"
            );
            return Ok(ctx);
        };

        let target_value = match ctx.fields.get_mut(&target_key) {
            Some(target) => {
                target.is_filter_field = true;
                if let Some(filter_type) = filter_type {
                    target.options.filter_type = Some(filter_type);
                }
                target.value.clone()
            }
            None => None,
        };

        let sort_keys = ctx.fields.keys_of_type(&FieldType::SortPosition);
        if let Some(sort_key) = sort_keys.first()
            && let Some(sort) = ctx.fields.get_mut(sort_key)
            && sort.raw.is_none()
        {
            sort.value = target_value.clone();
            sort.raw = target_value;
        }

        Ok(ctx)
    }

    fn step_name(&self) -> &str {
        "enum_filter"
    }
}
