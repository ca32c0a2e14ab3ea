//! Error types for the Bindery library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Bindery operations.
#[derive(Debug, Error)]
pub enum BinderyError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Collection file is missing a required column.
    #[error("Collection at '{path}' is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    /// Collection file exists but cannot be interpreted as a record set.
    #[error("Invalid collection: {0}")]
    InvalidCollection(String),

    /// Source export not in a recognized format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error from a metadata provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Metadata provider returned an unusable response.
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },
}

/// Result type alias for Bindery operations.
pub type Result<T> = std::result::Result<T, BinderyError>;
