//! Decorator pipeline with ordered stage execution.
//!
//! Each stage takes the whole [`FieldContext`] and returns the transformed
//! context. Synchronous stages always run before asynchronous ones, and
//! within each group stages run in insertion order.
//!
//! # Standard Pipeline Order
//!
//! Synchronous:
//! 1. **HiddenFieldDecorator** - drop timestamps, hide new-record ids and sort positions
//! 2. **JsonDecorator** - parse JSON-encoded string values
//! 3. **EnumFilterDecorator** - keep only the selected enum candidate
//! 4. **DynamicTypeDecorator** - apply per-column custom editors
//!
//! Asynchronous:
//! 1. **LoadAssociationsDecorator** - load candidates and selected records
//! 2. **AssociationConfigDecorator** - backfill option display config
//!
//! # Example
//!
//! ```ignore
//! let pipeline = build_default_pipeline(config, Some(resolver));
//! let ctx = pipeline.run(FieldContext::new("t_posts", fields)).await?;
//! ```

use std::sync::Arc;

use admin_model::{AdminConfig, FieldMap};
use async_trait::async_trait;
use tracing::debug;

use crate::association::AssociationResolver;
use crate::decorators::{
    AssociationConfigDecorator, DynamicTypeDecorator, EnumFilterDecorator, HiddenFieldDecorator,
    JsonDecorator, LoadAssociationsDecorator,
};
use crate::error::Result;

/// The unit of work passed between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContext {
    pub model_name: String,
    pub fields: FieldMap,
}

impl FieldContext {
    pub fn new(model_name: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            model_name: model_name.into(),
            fields,
        }
    }
}

/// A synchronous stage.
pub trait Decorator: Send + Sync {
    /// Transform the context. An error leaves the caller's map untouched.
    fn decorate(&self, ctx: FieldContext) -> Result<FieldContext>;

    /// Human-readable name for this stage (for logging/debugging).
    fn step_name(&self) -> &str;
}

/// An asynchronous stage.
#[async_trait]
pub trait AsyncDecorator: Send + Sync {
    /// Transform the context. An error leaves the caller's map untouched.
    async fn decorate(&self, ctx: FieldContext) -> Result<FieldContext>;

    /// Human-readable name for this stage (for logging/debugging).
    fn step_name(&self) -> &str;
}

/// Ordered synchronous and asynchronous stages.
#[derive(Default)]
pub struct DecoratorPipeline {
    steps: Vec<Box<dyn Decorator>>,
    async_steps: Vec<Box<dyn AsyncDecorator>>,
}

impl DecoratorPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a synchronous stage after the existing ones.
    #[must_use]
    pub fn add_step(mut self, step: Box<dyn Decorator>) -> Self {
        self.steps.push(step);
        self
    }

    /// Add an asynchronous stage after the existing ones.
    #[must_use]
    pub fn add_async_step(mut self, step: Box<dyn AsyncDecorator>) -> Self {
        self.async_steps.push(step);
        self
    }

    /// Remove every stage with the given name.
    #[must_use]
    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|s| s.step_name() != step_name);
        self.async_steps.retain(|s| s.step_name() != step_name);
        self
    }

    /// Run only the synchronous stages.
    pub fn run_sync(&self, mut ctx: FieldContext) -> Result<FieldContext> {
        for step in &self.steps {
            debug!(model = %ctx.model_name, step = step.step_name(), "running decorator");
            ctx = step.decorate(ctx)?;
        }
        Ok(ctx)
    }

    /// Run every stage: synchronous first, then asynchronous in order.
    pub async fn run(&self, ctx: FieldContext) -> Result<FieldContext> {
        let mut ctx = self.run_sync(ctx)?;
        for step in &self.async_steps {
            debug!(model = %ctx.model_name, step = step.step_name(), "running async decorator");
            ctx = step.decorate(ctx).await?;
        }
        Ok(ctx)
    }

    /// Stage names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|s| s.step_name())
            .chain(self.async_steps.iter().map(|s| s.step_name()))
            .collect()
    }
}

/// Synchronous stages only, for callers without association data.
pub fn build_sync_pipeline(config: Arc<AdminConfig>) -> DecoratorPipeline {
    DecoratorPipeline::new()
        .add_step(Box::new(HiddenFieldDecorator::new(Arc::clone(&config))))
        .add_step(Box::new(JsonDecorator))
        .add_step(Box::new(EnumFilterDecorator))
        .add_step(Box::new(DynamicTypeDecorator::new(config)))
}

/// The standard pipeline.
///
/// Without a resolver the association stage fails on the first relational
/// field that needs loading.
pub fn build_default_pipeline(
    config: Arc<AdminConfig>,
    resolver: Option<Arc<AssociationResolver>>,
) -> DecoratorPipeline {
    build_sync_pipeline(Arc::clone(&config))
        .add_async_step(Box::new(LoadAssociationsDecorator::new(resolver)))
        .add_async_step(Box::new(AssociationConfigDecorator::new(config)))
}
