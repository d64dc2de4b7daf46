//! Recursive descent through the Thema hierarchy
//!
//! Classification starts with one selection call over the root categories.
//! Every selected root opens a branch; within a branch the first (most
//! relevant) selection among the current node's children becomes the new
//! branch best, until a leaf is reached or the model selects nothing. Each
//! branch contributes its deepest node to the result.

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::selector::CategorySelector;
use metagen_domain::{
    extract_excerpt, CategoryResult, CategorySelection, Cost, DocumentPages, PageSelection,
    StructuredCompletion,
};
use metagen_llm::LlmError;
use metagen_thema::ThemaIndex;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Deepest selection of one branch and the cost of reaching it
#[derive(Debug)]
struct BranchOutcome {
    best: CategorySelection,
    cost: Cost,
}

/// Classifies documents into Thema categories
pub struct ThemaClassifier<C> {
    client: Arc<C>,
    index: Arc<ThemaIndex>,
    config: ClassifierConfig,
}

impl<C> ThemaClassifier<C>
where
    C: StructuredCompletion<Error = LlmError> + Send + Sync,
{
    /// Create a classifier over a shared taxonomy index
    ///
    /// # Errors
    ///
    /// `Config` if the configuration does not validate.
    pub fn new(
        client: C,
        index: Arc<ThemaIndex>,
        config: ClassifierConfig,
    ) -> Result<Self, ClassifierError> {
        config.validate().map_err(ClassifierError::Config)?;
        Ok(Self {
            client: Arc::new(client),
            index,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify an excerpt.
    ///
    /// Returns at most `max_categories` selections, in the order their
    /// top-level branches were selected, together with the summed cost of
    /// every call made.
    pub fn classify(&self, excerpt: &str) -> Result<CategoryResult, ClassifierError> {
        let start = Instant::now();
        let selector = CategorySelector::new(self.client.as_ref(), &self.config);

        let roots = self.index.root_categories();
        let top = selector.select(excerpt, &roots)?;
        let mut total_cost = top.cost;

        info!(
            "Selected {} top-level categories among {} roots",
            top.selections.len(),
            roots.len()
        );

        let mut selections = Vec::with_capacity(top.selections.len());
        if self.config.parallel_branches && top.selections.len() > 1 {
            for branch in self.descend_parallel(excerpt, &top.selections) {
                if let Some(outcome) = branch? {
                    total_cost += outcome.cost;
                    selections.push(outcome.best);
                }
            }
        } else {
            // A failed branch ends the request before the next one starts
            for selection in &top.selections {
                if let Some(outcome) = self.descend(excerpt, selection)? {
                    total_cost += outcome.cost;
                    selections.push(outcome.best);
                }
            }
        }

        if selections.len() > self.config.max_categories {
            debug!(
                "Truncating {} categories to {}",
                selections.len(),
                self.config.max_categories
            );
            selections.truncate(self.config.max_categories);
        }

        info!(
            "Classification complete: [{}], cost {}, {} ms",
            selections.iter().map(|s| s.code.as_str()).collect::<Vec<_>>().join(", "),
            total_cost,
            start.elapsed().as_millis()
        );

        Ok(CategoryResult::new(selections, total_cost))
    }

    /// Extract the classification excerpt from `document` and classify it
    pub fn classify_document<D>(&self, document: &D) -> Result<CategoryResult, ClassifierError>
    where
        D: DocumentPages,
        D::Error: Display,
    {
        let excerpt = extract_excerpt(document, PageSelection::CLASSIFICATION)
            .map_err(|e| ClassifierError::Document(format!("{}: {}", document.name(), e)))?;
        self.classify(&excerpt)
    }

    fn descend_parallel(
        &self,
        excerpt: &str,
        top: &[CategorySelection],
    ) -> Vec<Result<Option<BranchOutcome>, ClassifierError>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = top
                .iter()
                .map(|selection| scope.spawn(move || self.descend(excerpt, selection)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    /// Follow one branch down to its deepest selected node.
    ///
    /// `None` if the branch's top-level code is not in the index.
    fn descend(
        &self,
        excerpt: &str,
        selection: &CategorySelection,
    ) -> Result<Option<BranchOutcome>, ClassifierError> {
        if self.index.by_code(&selection.code).is_none() {
            warn!("Selected category '{}' is not in the index, skipping branch", selection.code);
            return Ok(None);
        }

        let selector = CategorySelector::new(self.client.as_ref(), &self.config);
        let mut best = selection.clone();
        let mut cost = Cost::ZERO;

        while let Some(node) = self.index.by_code(&best.code) {
            let children = self.index.children_of(node);
            if children.is_empty() {
                debug!("Branch {} reached leaf {}", selection.code, best.code);
                break;
            }

            match selector.select(excerpt, &children) {
                Ok(outcome) => {
                    cost += outcome.cost;
                    match outcome.selections.into_iter().next() {
                        Some(first) => best = first,
                        None => {
                            debug!(
                                "No child of {} applies, branch {} stops",
                                best.code, selection.code
                            );
                            break;
                        }
                    }
                }
                Err(e) if self.config.isolate_branch_failures => {
                    warn!(
                        "Selection below {} failed, keeping it as branch result: {}",
                        best.code, e
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Some(BranchOutcome { best, cost }))
    }
}
