//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint implementing the `/chat/completions` API (OpenAI,
//! OpenRouter, LiteLLM proxy, vLLM, ...). Structured output is requested
//! with `response_format: json_schema`.
//!
//! Cost is taken from `usage.cost` when the endpoint reports it, otherwise
//! derived from token usage when a [`Pricing`] table is attached.

use crate::http::send_with_retries;
use crate::{ChatBackend, ChatReply, ChatRequest, LlmError, Pricing};
use metagen_domain::{ChatMessage, Cost};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    max_retries: u32,
    temperature: Option<f32>,
    pricing: Option<Pricing>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    response_format: ResponseFormat<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a serde_json::Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    cost: Option<f64>,
}

impl OpenAiProvider {
    /// Create a provider for `base_url` (e.g. `https://api.openai.com/v1`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            temperature: None,
            pricing: None,
        })
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the maximum number of transport attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Derive costs from token usage when the endpoint reports none
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    fn reply_from_response(&self, response: ChatCompletionResponse) -> Result<ChatReply, LlmError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmError::InvalidResponse("Response contains no message content".to_string())
            })?;

        let cost = response.usage.and_then(|usage| match usage.cost {
            Some(reported) => Some(Cost::from_f64(reported)),
            None => self
                .pricing
                .map(|pricing| pricing.cost(usage.prompt_tokens, usage.completion_tokens)),
        });

        Ok(ChatReply { content, cost })
    }
}

/// Strip a LiteLLM-style `openai/` routing prefix
fn openai_model_name(model: &str) -> &str {
    model.strip_prefix("openai/").unwrap_or(model)
}

impl ChatBackend for OpenAiProvider {
    fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let model = openai_model_name(request.model);
        let body = ChatCompletionRequest {
            model,
            messages: request.messages,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    schema: request.schema,
                    strict: false,
                },
            },
            temperature: self.temperature,
        };

        debug!("Chat completion: model={}, messages={}", model, request.messages.len());

        let response = send_with_retries(self.max_retries, model, || {
            let builder = self.client.post(&url).json(&body);
            match &self.api_key {
                Some(key) => builder.bearer_auth(key),
                None => builder,
            }
        })?;
        let parsed = response
            .json::<ChatCompletionResponse>()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        self.reply_from_response(parsed)
    }
}
