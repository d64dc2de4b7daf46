//! Metagen LLM Provider Layer
//!
//! Pluggable chat backends plus the structured-completion client that turns
//! any backend into the domain's `StructuredCompletion` capability.
//!
//! # Architecture
//!
//! ```text
//! caller → StructuredClient (schema, parse, validate, retry) → ChatBackend → model
//! ```
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama chat API
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use metagen_domain::{CategorySelections, ChatMessage, StructuredCompletion};
//! use metagen_llm::{MockProvider, StructuredClient};
//!
//! let provider = MockProvider::new(r#"{"categories": []}"#);
//! let client = StructuredClient::new(provider);
//! let completion = client
//!     .complete::<CategorySelections>("gpt-4o", &[ChatMessage::user("classify")], 3)
//!     .unwrap();
//! assert!(completion.value.categories.is_empty());
//! ```

#![warn(missing_docs)]

mod http;
pub mod ollama;
pub mod openai;
mod structured;

use metagen_domain::{ChatMessage, Cost, Role};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use structured::{extract_json, StructuredClient};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// No schema-valid reply within the retry budget
    #[error("Failed to generate a valid {shape} after {attempts} attempt(s): {last_error}")]
    GenerationFailure {
        /// Name of the requested shape
        shape: &'static str,
        /// Attempts made
        attempts: u32,
        /// Validation error of the final attempt
        last_error: String,
    },

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One request to a chat backend
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Model identifier as understood by the backend
    pub model: &'a str,
    /// Conversation so far
    pub messages: &'a [ChatMessage],
    /// Name of the expected response shape
    pub schema_name: &'a str,
    /// JSON schema of the expected response
    pub schema: &'a serde_json::Value,
}

impl ChatRequest<'_> {
    /// Content of the most recent user message
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Raw reply of a chat backend
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// Text the model produced
    pub content: String,
    /// Cost of the call, when the backend can tell
    pub cost: Option<Cost>,
}

/// A chat model endpoint.
///
/// Backends handle transport concerns (HTTP, timeouts, transient-failure
/// retries). Parsing and validation belong to [`StructuredClient`].
pub trait ChatBackend {
    /// Send one chat request
    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, LlmError>;
}

impl<B: ChatBackend + ?Sized> ChatBackend for Box<B> {
    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, LlmError> {
        (**self).chat(request)
    }
}

impl<B: ChatBackend + ?Sized> ChatBackend for Arc<B> {
    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, LlmError> {
        (**self).chat(request)
    }
}

/// Token prices used to derive a cost when the API does not report one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Price per million prompt tokens
    pub input_per_million: f64,
    /// Price per million completion tokens
    pub output_per_million: f64,
}

impl Pricing {
    /// Create a price table
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Cost of a call with the given token counts
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> Cost {
        Cost::from_f64(prompt_tokens as f64 * self.input_per_million / 1_000_000.0)
            + Cost::from_f64(completion_tokens as f64 * self.output_per_million / 1_000_000.0)
    }
}

/// A request as seen by [`MockProvider`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Requested model
    pub model: String,
    /// Requested shape
    pub schema_name: String,
    /// Full conversation sent
    pub messages: Vec<ChatMessage>,
}

impl RecordedRequest {
    /// Content of the most recent user message
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Content { content: String, cost: Option<Cost> },
    Error(String),
}

impl MockReply {
    fn into_result(self) -> Result<ChatReply, LlmError> {
        match self {
            MockReply::Content { content, cost } => Ok(ChatReply { content, cost }),
            MockReply::Error(message) => Err(LlmError::Other(message)),
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. A reply is picked in this order:
///
/// 1. the next queued reply (`push_response`, `push_error`)
/// 2. the first rule whose pattern occurs in the latest user message
///    (`add_response`, `add_error`)
/// 3. the default reply
///
/// Every request is recorded. Clones share state, so a clone handed to the
/// code under test can be inspected afterwards.
///
/// # Examples
///
/// ```
/// use metagen_llm::{ChatBackend, ChatRequest, MockProvider};
/// use metagen_domain::ChatMessage;
///
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("hello", "world");
///
/// let schema = serde_json::json!({});
/// let messages = [ChatMessage::user("say hello")];
/// let request = ChatRequest { model: "m", messages: &messages, schema_name: "S", schema: &schema };
/// assert_eq!(provider.chat(&request).unwrap().content, "world");
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_reply: MockReply::Content {
                content: response.into(),
                cost: None,
            },
            rules: Arc::new(Mutex::new(Vec::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for prompts containing `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        self.add_response_with_cost(pattern, response, None);
    }

    /// Add a response with a reported cost for prompts containing `pattern`
    pub fn add_response_with_cost(
        &mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
        cost: Option<f64>,
    ) {
        lock(&self.rules).push((
            pattern.into(),
            MockReply::Content {
                content: response.into(),
                cost: cost.map(Cost::from_f64),
            },
        ));
    }

    /// Configure to return an error for prompts containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        lock(&self.rules).push((pattern.into(), MockReply::Error("Mock error".to_string())));
    }

    /// Queue a response for the next call
    pub fn push_response(&self, response: impl Into<String>) {
        self.push_response_with_cost(response, None);
    }

    /// Queue a response with a reported cost for the next call
    pub fn push_response_with_cost(&self, response: impl Into<String>, cost: Option<f64>) {
        lock(&self.queue).push_back(MockReply::Content {
            content: response.into(),
            cost: cost.map(Cost::from_f64),
        });
    }

    /// Queue an error for the next call
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.queue).push_back(MockReply::Error(message.into()));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Latest user message of the most recent request
    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.requests).last().map(|r| r.prompt().to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatBackend for MockProvider {
    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, LlmError> {
        lock(&self.requests).push(RecordedRequest {
            model: request.model.to_string(),
            schema_name: request.schema_name.to_string(),
            messages: request.messages.to_vec(),
        });

        if let Some(reply) = lock(&self.queue).pop_front() {
            return reply.into_result();
        }

        let prompt = request.last_user_message().unwrap_or("");
        let rules = lock(&self.rules);
        if let Some((_, reply)) = rules
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
        {
            return reply.clone().into_result();
        }

        self.default_reply.clone().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(provider: &MockProvider, prompt: &str) -> Result<ChatReply, LlmError> {
        let schema = serde_json::json!({});
        let messages = [ChatMessage::system("sys"), ChatMessage::user(prompt)];
        provider.chat(&ChatRequest {
            model: "test-model",
            messages: &messages,
            schema_name: "Test",
            schema: &schema,
        })
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let reply = chat(&provider, "any prompt").unwrap();
        assert_eq!(reply.content, "Test response");
        assert_eq!(reply.cost, None);
    }

    #[test]
    fn test_mock_provider_rules() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response_with_cost("foo", "bar", Some(0.5));

        assert_eq!(chat(&provider, "say hello").unwrap().content, "world");
        let reply = chat(&provider, "foo fighters").unwrap();
        assert_eq!(reply.content, "bar");
        assert_eq!(reply.cost, Some(Cost::from_f64(0.5)));
        assert_eq!(chat(&provider, "unknown").unwrap().content, "Default mock response");
    }

    #[test]
    fn test_mock_provider_queue_takes_precedence() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "rule");
        provider.push_response("queued");

        assert_eq!(chat(&provider, "hello").unwrap().content, "queued");
        assert_eq!(chat(&provider, "hello").unwrap().content, "rule");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        chat(&provider, "prompt1").unwrap();
        chat(&provider, "prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt2"));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");
        provider.push_error("queued failure");

        assert!(matches!(chat(&provider, "x"), Err(LlmError::Other(_))));
        assert!(matches!(chat(&provider, "bad prompt"), Err(LlmError::Other(_))));
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        chat(&provider1, "test").unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
        assert_eq!(provider2.requests()[0].model, "test-model");
    }

    #[test]
    fn test_pricing() {
        let pricing = Pricing::new(2.5, 10.0);
        let cost = pricing.cost(1_000, 500);
        assert_eq!(cost, Cost::from_f64(0.0075));
    }
}
