//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::cost::Cost;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation
    System,
    /// The caller
    User,
    /// The model
    Assistant,
}

/// One message of a completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A result type the model can be asked to produce.
///
/// The schema is derived from the type and sent to the model; `validate`
/// enforces the constraints a JSON schema cannot express (or that the model
/// ignored).
pub trait ResponseShape: DeserializeOwned + JsonSchema {
    /// Name of the shape, used as the schema name in requests
    const NAME: &'static str;

    /// JSON schema describing the expected object
    fn json_schema() -> serde_json::Value {
        schemars::schema_for!(Self).to_value()
    }

    /// Check field constraints after deserialization
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A validated object together with what it cost to produce
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    /// The schema-valid object
    pub value: T,
    /// Reported cost, `None` when the backend does not report one
    pub cost: Option<Cost>,
}

impl<T> Completion<T> {
    /// Cost with absent treated as zero
    pub fn cost_or_zero(&self) -> Cost {
        self.cost.unwrap_or_default()
    }
}

/// Trait for structured completion
///
/// Implemented by the infrastructure layer (metagen-llm)
pub trait StructuredCompletion {
    /// Error type for completion operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Ask `model` for a `T`, retrying up to `max_retries` attempts until the
    /// reply deserializes and validates.
    fn complete<T: ResponseShape>(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_retries: u32,
    ) -> Result<Completion<T>, Self::Error>;
}

/// Page-addressable text of a document
///
/// Implemented by the text extraction layer (metagen-cli)
pub trait DocumentPages {
    /// Error type for page extraction
    type Error;

    /// Number of pages
    fn page_count(&self) -> usize;

    /// Plain or markdown text of the page at `index` (zero-based)
    fn page_text(&self, index: usize) -> Result<String, Self::Error>;

    /// Display name used in log messages
    fn name(&self) -> &str {
        "document"
    }
}
