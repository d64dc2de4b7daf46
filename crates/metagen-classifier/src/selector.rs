//! One level of category selection

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::prompt::SelectionPrompt;
use metagen_domain::{
    CategoryNode, CategorySelection, CategorySelections, ChatMessage, Cost, StructuredCompletion,
};
use metagen_llm::LlmError;
use tracing::{debug, warn};

/// Selections returned by one call and what the call cost
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionOutcome {
    /// Chosen categories, most relevant first
    pub selections: Vec<CategorySelection>,
    /// Cost of the call, zero when none was reported
    pub cost: Cost,
}

/// Asks the model to pick categories from a candidate list
pub struct CategorySelector<'a, C> {
    client: &'a C,
    config: &'a ClassifierConfig,
}

impl<'a, C> CategorySelector<'a, C>
where
    C: StructuredCompletion<Error = LlmError>,
{
    /// Create a selector using `config`'s model, retries and limits
    pub fn new(client: &'a C, config: &'a ClassifierConfig) -> Self {
        Self { client, config }
    }

    /// Ask for up to `max_selections_per_call` categories among `candidates`.
    ///
    /// Codes the model returns that are not candidates are dropped, so every
    /// returned selection names one of `candidates`. The remaining list is
    /// returned as the model ranked it, even when it is longer than asked.
    pub fn select(
        &self,
        excerpt: &str,
        candidates: &[&CategoryNode],
    ) -> Result<SelectionOutcome, ClassifierError> {
        let prompt = SelectionPrompt::new(excerpt, candidates)
            .with_max_selections(self.config.max_selections_per_call)
            .build();
        let messages = [
            ChatMessage::system(self.config.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];

        debug!("Selecting among {} candidate categories", candidates.len());

        let completion = self.client.complete::<CategorySelections>(
            &self.config.model,
            &messages,
            self.config.max_retries,
        )?;
        let cost = completion.cost_or_zero();

        let mut selections = Vec::new();
        for selection in completion.value.categories {
            if !candidates.iter().any(|node| node.code == selection.code) {
                warn!(
                    "Model returned category '{}' which was not offered, skipping",
                    selection.code
                );
                continue;
            }
            if selections.iter().any(|s: &CategorySelection| s.code == selection.code) {
                continue;
            }
            selections.push(selection);
        }

        debug!(
            "Selected [{}] (cost {})",
            selections.iter().map(|s| s.code.as_str()).collect::<Vec<_>>().join(", "),
            cost
        );

        Ok(SelectionOutcome { selections, cost })
    }
}
