//! Structured completion on top of a chat backend

use crate::{ChatBackend, ChatRequest, LlmError};
use metagen_domain::{ChatMessage, Completion, Cost, ResponseShape, StructuredCompletion};
use tracing::{debug, warn};

/// Turns a [`ChatBackend`] into a [`StructuredCompletion`] capability.
///
/// Each attempt sends the conversation together with the target schema,
/// parses the reply and validates it. A reply that fails either step is fed
/// back to the model with the error so the next attempt can correct it.
/// Costs of all attempts are summed.
#[derive(Debug, Clone)]
pub struct StructuredClient<B> {
    backend: B,
}

impl<B: ChatBackend> StructuredClient<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChatBackend> StructuredCompletion for StructuredClient<B> {
    type Error = LlmError;

    fn complete<T: ResponseShape>(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_retries: u32,
    ) -> Result<Completion<T>, LlmError> {
        let schema = <T as ResponseShape>::json_schema();
        let attempts = max_retries.max(1);
        let mut conversation = messages.to_vec();
        let mut cost: Option<Cost> = None;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let request = ChatRequest {
                model,
                messages: &conversation,
                schema_name: T::NAME,
                schema: &schema,
            };
            let reply = self.backend.chat(&request)?;

            if let Some(call_cost) = reply.cost {
                cost = Some(cost.unwrap_or_default() + call_cost);
            }

            match parse_reply::<T>(&reply.content) {
                Ok(value) => {
                    debug!("{} validated on attempt {}/{}", T::NAME, attempt, attempts);
                    return Ok(Completion { value, cost });
                }
                Err(e) => {
                    warn!("{} attempt {}/{} rejected: {}", T::NAME, attempt, attempts, e);
                    conversation.push(ChatMessage::assistant(reply.content));
                    conversation.push(ChatMessage::user(correction_prompt(T::NAME, &e)));
                    last_error = e;
                }
            }
        }

        Err(LlmError::GenerationFailure {
            shape: T::NAME,
            attempts,
            last_error,
        })
    }
}

fn correction_prompt(shape: &str, error: &str) -> String {
    format!(
        "Your previous response was not a valid {}.\nValidation errors: {}\n\
         Respond again with a single JSON object that satisfies the schema. \
         Return ONLY valid JSON, no markdown code blocks, no explanations.",
        shape, error
    )
}

fn parse_reply<T: ResponseShape>(content: &str) -> Result<T, String> {
    let json = extract_json(content);
    let value: T = serde_json::from_str(json).map_err(|e| format!("JSON parse error: {}", e))?;
    value.validate()?;
    Ok(value)
}

/// Extract the JSON object from a reply, handling markdown code blocks and
/// chatter around the object
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    let unfenced = if trimmed.starts_with("```") {
        let body = trimmed
            .split_once('\n')
            .map(|(_, rest)| rest)
            .unwrap_or("");
        body.trim_end().trim_end_matches("```").trim()
    } else {
        trimmed
    };

    if unfenced.starts_with('{') || unfenced.starts_with('[') {
        return unfenced;
    }
    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}
