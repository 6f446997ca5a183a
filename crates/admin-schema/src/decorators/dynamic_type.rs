use std::sync::Arc;

use admin_model::{AdminConfig, FieldType};
use tracing::debug;

use crate::error::Result;
use crate::pipeline::{Decorator, FieldContext};

/// Lets per-column custom editors decide a field's type.
///
/// Every editor sees the map as it entered this stage.
pub struct DynamicTypeDecorator {
    config: Arc<AdminConfig>,
}

impl DynamicTypeDecorator {
    pub fn new(config: Arc<AdminConfig>) -> Self {
        Self { config }
    }
}

impl Decorator for DynamicTypeDecorator {
    fn decorate(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        let Some(model) = self.config.model(&ctx.model_name) else {
            return Ok(ctx);
        };
        if model.editors.is_empty() {
            return Ok(ctx);
        }

        let overrides: Vec<(String, FieldType)> = ctx
            .fields
            .iter()
            .filter_map(|(key, field)| {
                let editor = model.editor(&field.column).or_else(|| model.editor(key))?;
                Some((key.clone(), editor(&ctx.fields)))
            })
            .collect();

        for (key, field_type) in overrides {
            if let Some(field) = ctx.fields.get_mut(&key) {
                debug!(model = %ctx.model_name, field = %key, field_type = %field_type, "custom editor type");
                field.field_type = Some(field_type);
            }
        }
        Ok(ctx)
    }

    fn step_name(&self) -> &str {
        "dynamic_type"
    }
}
