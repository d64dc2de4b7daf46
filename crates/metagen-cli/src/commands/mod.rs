//! Command implementations.

pub mod classify;
pub mod generate;
pub mod pages;
pub mod thema;

pub use self::classify::execute_classify;
pub use self::generate::execute_generate;
pub use self::pages::execute_pages;
pub use self::thema::execute_thema;

use crate::config::{Config, LlmSettings, Provider};
use crate::error::Result;
use metagen_llm::{ollama, openai, ChatBackend, OllamaProvider, OpenAiProvider, StructuredClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Structured client over whichever backend the configuration selects.
pub type LlmClient = StructuredClient<Arc<dyn ChatBackend + Send + Sync>>;

/// Build the LLM client described by the `[llm]` section.
pub fn build_client(config: &Config) -> Result<LlmClient> {
    Ok(StructuredClient::new(build_backend(&config.llm)?))
}

fn build_backend(settings: &LlmSettings) -> Result<Arc<dyn ChatBackend + Send + Sync>> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    match settings.provider {
        Provider::Ollama => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT);
            debug!("Using Ollama at {}", endpoint);
            let mut provider = OllamaProvider::with_timeout(endpoint, timeout)?
                .with_max_retries(settings.max_retries)
                .with_num_ctx(settings.num_ctx)
                .with_temperature(settings.temperature);
            if let Some(pricing) = settings.pricing {
                provider = provider.with_pricing(pricing);
            }
            Ok(Arc::new(provider))
        }
        Provider::Openai => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(openai::DEFAULT_BASE_URL);
            debug!("Using OpenAI-compatible API at {}", endpoint);
            let mut provider = OpenAiProvider::with_timeout(endpoint, timeout)?
                .with_max_retries(settings.max_retries)
                .with_temperature(settings.temperature);
            if let Some(api_key) = &settings.api_key {
                provider = provider.with_api_key(api_key.as_str());
            }
            if let Some(pricing) = settings.pricing {
                provider = provider.with_pricing(pricing);
            }
            Ok(Arc::new(provider))
        }
    }
}
