//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API. Local models are free
//! to run, so no cost is reported unless a [`Pricing`] table is attached.
//!
//! # Features
//!
//! - Blocking HTTP communication with the `/api/chat` endpoint
//! - JSON-schema constrained output via the `format` field
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use metagen_llm::{OllamaProvider, StructuredClient};
//!
//! let provider = OllamaProvider::new("http://localhost:11434").unwrap();
//! let client = StructuredClient::new(provider);
//! ```

use crate::http::send_with_retries;
use crate::{ChatBackend, ChatReply, ChatRequest, LlmError, Pricing};
use metagen_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default context window
pub const DEFAULT_NUM_CTX: u32 = 8192;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
    num_ctx: u32,
    temperature: f32,
    pricing: Option<Pricing>,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    format: &'a serde_json::Value,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_ctx: u32,
    temperature: f32,
}

/// Response from Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            num_ctx: DEFAULT_NUM_CTX,
            temperature: DEFAULT_TEMPERATURE,
            pricing: None,
        })
    }

    /// Create a provider for `http://localhost:11434`
    pub fn default_endpoint() -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Set the maximum number of transport attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the context window passed to the model
    pub fn with_num_ctx(mut self, num_ctx: u32) -> Self {
        self.num_ctx = num_ctx;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Derive costs from token counts
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    fn reply_from_response(&self, response: OllamaChatResponse) -> ChatReply {
        let cost = self.pricing.map(|pricing| {
            pricing.cost(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            )
        });
        ChatReply {
            content: response.message.content,
            cost,
        }
    }
}

/// Model names may carry a routing prefix (`ollama/llama3`); Ollama wants
/// the bare name.
fn ollama_model_name(model: &str) -> &str {
    model
        .strip_prefix("ollama_chat/")
        .or_else(|| model.strip_prefix("ollama/"))
        .unwrap_or(model)
}

impl ChatBackend for OllamaProvider {
    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);
        let model = ollama_model_name(request.model);
        let body = OllamaChatRequest {
            model,
            messages: request.messages,
            stream: false,
            format: request.schema,
            options: OllamaOptions {
                num_ctx: self.num_ctx,
                temperature: self.temperature,
            },
        };

        debug!("Ollama chat: model={}, messages={}", model, request.messages.len());

        let response = send_with_retries(self.max_retries, model, || {
            self.client.post(&url).json(&body)
        })?;
        let parsed = response
            .json::<OllamaChatResponse>()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(self.reply_from_response(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(provider.num_ctx, DEFAULT_NUM_CTX);
        assert!(provider.pricing.is_none());
    }

    #[test]
    fn test_ollama_provider_builders() {
        let provider = OllamaProvider::default_endpoint()
            .unwrap()
            .with_max_retries(5)
            .with_num_ctx(4096)
            .with_temperature(0.0);
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.max_retries, 5);
        assert_eq!(provider.num_ctx, 4096);
        assert_eq!(provider.temperature, 0.0);
    }

    #[test]
    fn test_model_prefix_stripped() {
        assert_eq!(
            ollama_model_name("ollama/qwen2.5:7b-instruct-q8_0"),
            "qwen2.5:7b-instruct-q8_0"
        );
        assert_eq!(ollama_model_name("ollama_chat/llama3"), "llama3");
        assert_eq!(ollama_model_name("mistral"), "mistral");
    }

    #[test]
    fn test_reply_without_pricing_has_no_cost() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        let response: OllamaChatResponse = serde_json::from_str(
            r#"{"message": {"role": "assistant", "content": "{}"}, "done": true, "prompt_eval_count": 100, "eval_count": 20}"#,
        )
        .unwrap();
        let reply = provider.reply_from_response(response);
        assert_eq!(reply.content, "{}");
        assert_eq!(reply.cost, None);
    }

    #[test]
    fn test_reply_with_pricing() {
        let provider = OllamaProvider::default_endpoint()
            .unwrap()
            .with_pricing(Pricing::new(1.0, 2.0));
        let response: OllamaChatResponse = serde_json::from_str(
            r#"{"message": {"content": "{}"}, "prompt_eval_count": 1000000, "eval_count": 500000}"#,
        )
        .unwrap();
        let reply = provider.reply_from_response(response);
        assert_eq!(reply.cost, Some(metagen_domain::Cost::from_f64(2.0)));
    }

    #[test]
    fn test_ollama_error_handling() {
        // Nothing listens on port 1
        let provider = OllamaProvider::new("http://127.0.0.1:1")
            .unwrap()
            .with_max_retries(1);
        let schema = serde_json::json!({});
        let messages = [ChatMessage::user("test")];
        let result = provider.chat(&ChatRequest {
            model: "llama2",
            messages: &messages,
            schema_name: "Test",
            schema: &schema,
        });

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            _ => panic!("Expected Communication error"),
        }
    }

    // Integration tests (requires running Ollama)
    #[test]
    #[ignore] // Only run when Ollama is available
    fn test_ollama_chat_integration() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        let schema = serde_json::json!({
            "type": "object",
            "properties": {"greeting": {"type": "string"}}
        });
        let messages = [ChatMessage::user("Say hello in JSON")];
        let result = provider.chat(&ChatRequest {
            model: "llama3",
            messages: &messages,
            schema_name: "Greeting",
            schema: &schema,
        });
        if let Ok(reply) = result {
            assert!(!reply.content.is_empty());
        }
    }
}
