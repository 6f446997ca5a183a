use admin_model::{FieldDescriptor, JsonEncoding};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::pipeline::{Decorator, FieldContext};

/// Parses values of fields stored as JSON-encoded strings.
///
/// Empty or malformed strings become `null`. Objects and arrays pass
/// through. The original string is kept in `raw`; a value equal to the parse
/// of `raw` is left alone on later passes, any other string is parsed again.
pub struct JsonDecorator;

impl Decorator for JsonDecorator {
    fn decorate(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        for (key, field) in ctx.fields.iter_mut() {
            if field.options.json != Some(JsonEncoding::Str) {
                continue;
            }
            decode_field(&ctx.model_name, key, field);
        }
        Ok(ctx)
    }

    fn step_name(&self) -> &str {
        "json"
    }
}

fn decode_field(model_name: &str, key: &str, field: &mut FieldDescriptor) {
    let Some(value) = field.value.take() else {
        return;
    };
    if parsed_from_raw(field.raw.as_ref(), &value) {
        field.value = Some(value);
        return;
    }

    field.value = Some(match value {
        Value::String(text) => {
            let parsed = parse_json(model_name, key, &text);
            field.raw = Some(Value::String(text));
            parsed
        }
        Value::Object(_) | Value::Array(_) => value,
        _ => Value::Null,
    });
}

/// True when `value` is what parsing the string in `raw` yields.
fn parsed_from_raw(raw: Option<&Value>, value: &Value) -> bool {
    let Some(Value::String(raw)) = raw else {
        return false;
    };
    let parsed = if raw.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(raw).unwrap_or(Value::Null)
    };
    parsed == *value
}

fn parse_json(model_name: &str, key: &str, text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(model = model_name, field = key, error = %err, "malformed JSON value");
            Value::Null
        }
    }
}
