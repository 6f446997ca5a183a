//! Data model for the admin schema pipeline.
//!
//! - [`column`]: raw column descriptors as published by the schema source
//! - [`field`]: typed, UI-ready field descriptors and the [`FieldMap`]
//! - [`config`]: model-level configuration supplied by the host application
//! - [`casing`]: snake/camel casting and casing-insensitive key comparison
//! - [`paging`]: paged responses and association queries

pub mod casing;
pub mod column;
pub mod config;
pub mod error;
pub mod field;
pub mod paging;

pub use casing::{cast_name, normalize_key, same_key};
pub use column::{
    Accessibility, ColumnConfig, ColumnLength, EnumOption, JsonEncoding, OriginSchema, RawColumn,
    RawInfo, SchemaInfo,
};
pub use config::{
    AdminConfig, AssociationConfig, CustomEditor, DEFAULT_PAGE_SIZE, FieldSettings, ModelConfig,
    NameCasing,
};
pub use error::{ModelError, Result};
pub use field::{
    AssociationBundle, Entity, FieldDescriptor, FieldMap, FieldOptions, FieldType, ForeignOption,
};
pub use paging::{AssociationQuery, PagedResponse};
