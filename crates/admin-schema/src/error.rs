//! Error types for schema resolution and decoration.

use admin_batch::BatchError;
use thiserror::Error;

/// Errors that abort a pipeline run and reach the caller.
///
/// Per-field problems (unidentified types, malformed JSON, a single failed
/// association lookup) never surface here; they degrade the field and log.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// A relational field needs loading but no association source is set.
    #[error("No association source configured (model {model}, field {field})")]
    MissingAssociationSource { model: String, field: String },

    /// Search was requested without an association source.
    #[error("No association source configured to search {model}")]
    SearchUnavailable { model: String },

    /// The schema source failed.
    #[error("Failed to load schema for {model}: {source}")]
    Schema {
        model: String,
        #[source]
        source: anyhow::Error,
    },

    /// The association source failed while serving a search.
    #[error("Failed to search {model}: {source}")]
    Search {
        model: String,
        #[source]
        source: anyhow::Error,
    },

    /// A decorator rejected the field map.
    #[error("Stage {stage} failed for {model}: {message}")]
    Stage {
        stage: String,
        model: String,
        message: String,
    },

    #[error(transparent)]
    Batch(#[from] BatchError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
