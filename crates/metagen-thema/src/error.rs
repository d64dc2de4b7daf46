//! Error types for taxonomy loading

use thiserror::Error;

/// Errors that can occur while loading or parsing the taxonomy
#[derive(Error, Debug)]
pub enum ThemaError {
    /// Taxonomy data is structurally corrupt (cycles, duplicate codes)
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Neither the local cache nor the remote source produced data
    #[error("Thema data unavailable (local: {local}; remote: {remote})")]
    SourceUnavailable {
        /// Why the local cache could not be used
        local: String,
        /// Why the remote source could not be used
        remote: String,
    },

    /// The JSON does not have the expected layout
    #[error("Invalid Thema format: {0}")]
    InvalidFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
