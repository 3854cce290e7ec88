//! Error types for the journal engine.

use std::path::PathBuf;

use campaign_model::ModelError;
use thiserror::Error;

/// Failures writing to a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write key {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error for journal operations that can fail.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type JournalResult<T> = Result<T, JournalError>;
