use std::sync::Arc;

use admin_model::{AdminConfig, FieldType, same_key};

use crate::error::Result;
use crate::pipeline::{Decorator, FieldContext};

const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

/// Drops timestamps and hides fields the user never edits directly.
///
/// The primary key is hidden only while its value is nil, so new records
/// show no id field and existing records do. Sort positions are always
/// hidden since the UI manages them.
pub struct HiddenFieldDecorator {
    config: Arc<AdminConfig>,
}

impl HiddenFieldDecorator {
    pub fn new(config: Arc<AdminConfig>) -> Self {
        Self { config }
    }
}

impl Decorator for HiddenFieldDecorator {
    fn decorate(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        let configured_key = self
            .config
            .model(&ctx.model_name)
            .and_then(|c| c.primary_key.clone());

        ctx.fields
            .retain(|key, field| !is_timestamp(key) && !is_timestamp(&field.column));

        for (key, field) in ctx.fields.iter_mut() {
            let is_primary = field.options.primary_key
                || configured_key
                    .as_deref()
                    .is_some_and(|pk| same_key(pk, key) || same_key(pk, &field.column));
            if is_primary && field.value_is_nil() {
                field.options.hidden = true;
            }
            if field.is_type(&FieldType::SortPosition) {
                field.options.hidden = true;
            }
        }
        Ok(ctx)
    }

    fn step_name(&self) -> &str {
        "hidden_fields"
    }
}

fn is_timestamp(name: &str) -> bool {
    !name.is_empty() && TIMESTAMP_FIELDS.iter().any(|t| same_key(t, name))
}
