//! Error types for classification and generation

use metagen_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while classifying or describing a document
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The completion capability failed or gave up
    #[error("Generation error: {0}")]
    Generation(#[from] LlmError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document text could not be extracted
    #[error("Document error: {0}")]
    Document(String),
}
