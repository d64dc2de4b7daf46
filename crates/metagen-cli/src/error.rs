//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// PDF could not be read
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Taxonomy error
    #[error(transparent)]
    Thema(#[from] metagen_thema::ThemaError),

    /// LLM provider error
    #[error(transparent)]
    Llm(#[from] metagen_llm::LlmError),

    /// Classification or generation error
    #[error(transparent)]
    Classifier(#[from] metagen_classifier::ClassifierError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
