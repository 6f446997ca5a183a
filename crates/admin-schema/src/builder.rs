//! Converts raw column lists into field maps.

use admin_model::{
    Accessibility, AdminConfig, ColumnLength, FieldDescriptor, FieldMap, FieldOptions, ModelConfig,
    RawColumn, cast_name,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::resolver::TypeResolver;

/// Builds the base field map of a model from its raw columns.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchemaBuilder<'a> {
    config: &'a AdminConfig,
}

impl<'a> FieldSchemaBuilder<'a> {
    pub fn new(config: &'a AdminConfig) -> Self {
        Self { config }
    }

    /// Builds one descriptor per column, keyed by update reference.
    ///
    /// Field values come from `values` when given; a missing key leaves the
    /// value undefined rather than null.
    pub fn build(
        &self,
        model_name: &str,
        columns: &[RawColumn],
        values: Option<&Map<String, Value>>,
    ) -> FieldMap {
        let model_config = self.config.model(model_name);
        let resolver = TypeResolver::for_schema(model_name, columns, model_config);

        let mut fields = FieldMap::new();
        for column in columns {
            let field = self.build_field(&resolver, model_config, column, values);
            let key = field.reference.clone();
            if fields.insert(key.clone(), field).is_some() {
                debug!(model = model_name, field = %key, "duplicate field key replaced");
            }
        }
        fields
    }

    fn build_field(
        &self,
        resolver: &TypeResolver,
        model_config: Option<&ModelConfig>,
        column: &RawColumn,
        values: Option<&Map<String, Value>>,
    ) -> FieldDescriptor {
        let config = &column.config;
        let info = &config.info;

        let name = cast_name(&column.name, self.config.casing);
        let reference = info
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map_or_else(|| name.clone(), str::to_string);

        let mut options = FieldOptions {
            label: info.name.clone(),
            length: config.length.as_ref().and_then(ColumnLength::as_len),
            required: !config.nullable.unwrap_or(false) || info.required,
            primary_key: config.primary_key || resolver.is_primary_key(&column.name),
            selectable: config.selectable.clone(),
            json: info.json,
            accessible: info.accessible,
            enum_data: info.enum_data.clone(),
            filter_type: info.filter_type.clone(),
            help: info.help.clone(),
            field_type: info.field_type.clone(),
            hidden: info.accessible == Some(Accessibility::Hidden),
            ..FieldOptions::default()
        };
        if let Some(settings) = model_config.and_then(|c| c.settings.get(&column.name)) {
            settings.apply(&mut options);
        }

        let value = values.and_then(|values| {
            values
                .get(&reference)
                .or_else(|| values.get(&column.name))
                .or_else(|| values.get(&name))
                .cloned()
        });

        FieldDescriptor {
            name,
            reference,
            column: column.name.clone(),
            field_type: resolver.identify(column),
            value,
            raw: None,
            options,
            is_filter_field: false,
            associations: None,
        }
    }
}
