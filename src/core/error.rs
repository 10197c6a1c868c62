//! Error types for category mapping
//!
//! Every failure aborts the run; nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),

    #[error("malformed category node at {location}: missing `{field}`")]
    MalformedTree {
        location: String,
        field: &'static str,
    },

    #[error("duplicate category id `{id}` in target tree")]
    DuplicateCategory { id: String },

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid category tree {}: {source}", .path.display())]
    TreeFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid embedding cache {}: {reason} (delete the file to rebuild it)", .path.display())]
    Deserialization { path: PathBuf, reason: String },

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("failed to encode {text:?}: {source}")]
    Encode {
        text: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("embedding dimension mismatch for `{id}`: query has {expected}, cache has {found}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn encode(text: &str, source: anyhow::Error) -> Self {
        Self::Encode {
            text: text.to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
