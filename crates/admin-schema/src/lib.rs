//! Schema resolution and field decoration for admin forms.
//!
//! This crate turns raw column lists into UI-ready field maps:
//!
//! - **Type inference** ([`TypeResolver`]): rule-based widget type selection
//! - **Field building** ([`FieldSchemaBuilder`]): raw columns to a [`FieldMap`]
//! - **Decoration** ([`DecoratorPipeline`]): ordered sync and async stages
//! - **Associations** ([`AssociationResolver`]): batched relational lookups
//! - **Orchestration** ([`ModelAdapter`]): caching and the renderer-facing API
//!
//! # Example
//!
//! ```rust,ignore
//! use admin_schema::ModelAdapter;
//!
//! let adapter = ModelAdapter::new(config, schemas).with_associations(records);
//! let fields = adapter.form_fields("t_posts", Some(&values)).await?;
//! ```

pub mod adapter;
pub mod association;
pub mod builder;
pub mod cache;
pub mod decorators;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod source;

pub use adapter::ModelAdapter;
pub use association::{AssociationResolver, DEFAULT_ID_FIELD, extract_ids, id_key};
pub use builder::FieldSchemaBuilder;
pub use cache::SchemaCache;
pub use error::{PipelineError, Result};
pub use pipeline::{
    AsyncDecorator, Decorator, DecoratorPipeline, FieldContext, build_default_pipeline,
    build_sync_pipeline,
};
pub use resolver::{TypeResolver, basic_type, identify_type};
pub use source::{AssociationSource, SchemaSource};
