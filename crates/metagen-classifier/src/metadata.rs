//! Bibliographic metadata generation

use crate::config::GeneratorConfig;
use crate::error::ClassifierError;
use metagen_domain::{
    extract_excerpt, BookMetadata, ChatMessage, DocumentPages, PageSelection, StructuredCompletion,
};
use metagen_llm::LlmError;
use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

/// Produces a [`BookMetadata`] record from document text
pub struct MetadataGenerator<C> {
    client: Arc<C>,
    config: GeneratorConfig,
}

impl<C> MetadataGenerator<C>
where
    C: StructuredCompletion<Error = LlmError>,
{
    /// Create a generator
    pub fn new(client: C, config: GeneratorConfig) -> Result<Self, ClassifierError> {
        config.validate().map_err(ClassifierError::Config)?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Generate metadata for `excerpt` with one completion call.
    ///
    /// `model` and `max_retries` fall back to the configured values. The
    /// returned record carries the model used and, when the call reported
    /// one, its cost.
    pub fn generate(
        &self,
        excerpt: &str,
        model: Option<&str>,
        max_retries: Option<u32>,
    ) -> Result<BookMetadata, ClassifierError> {
        let model = model.unwrap_or(self.config.model.as_str());
        let max_retries = max_retries.unwrap_or(self.config.max_retries);
        let messages = [
            ChatMessage::system(self.config.system_prompt.as_str()),
            ChatMessage::user(excerpt),
        ];

        info!("Generating metadata with {} ({} chars of text)", model, excerpt.len());

        let completion = self.client.complete::<BookMetadata>(model, &messages, max_retries)?;
        let mut metadata = completion.value;
        metadata.model = model.to_string();
        if let Some(cost) = completion.cost {
            metadata.response_cost = cost;
        }

        info!("Generated metadata for '{}' (cost {})", metadata.title, metadata.response_cost);
        Ok(metadata)
    }

    /// Extract the metadata excerpt from `document` and generate metadata
    pub fn generate_for_document<D>(&self, document: &D) -> Result<BookMetadata, ClassifierError>
    where
        D: DocumentPages,
        D::Error: Display,
    {
        let excerpt = extract_excerpt(document, PageSelection::METADATA)
            .map_err(|e| ClassifierError::Document(format!("{}: {}", document.name(), e)))?;
        self.generate(&excerpt, None, None)
    }
}
