use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading model-level configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
