//! Error types for baseline storage and verification.

use std::path::PathBuf;

use canonical_errors::{ErrorCategory, SchemaError};

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("failed to access baseline {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed baseline {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Baseline(#[from] BaselineError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A generated schema was rejected by the validator.
    #[error("schema '{id}' is not a valid JSON Schema: {message}")]
    InvalidSchema { id: &'static str, message: String },
    #[error("failed to serialize problem for {category}: {source}")]
    Serialize {
        category: ErrorCategory,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
