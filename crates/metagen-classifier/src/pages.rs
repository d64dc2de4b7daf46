//! Collect the pages of a book that carry bibliographic information
//!
//! Title pages, imprints and tables of contents are usually found at the
//! front of a book. Imprints sometimes sit at the very end, so the back is
//! searched when the front scan found none.

use crate::config::PageCollectorConfig;
use crate::error::ClassifierError;
use crate::prompt::page_type_prompt;
use metagen_domain::{ChatMessage, DocumentPages, Page, PageKind, PageType, StructuredCompletion};
use metagen_llm::LlmError;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Classifies pages and keeps the relevant ones
pub struct RelevantPageCollector<C> {
    client: Arc<C>,
    config: PageCollectorConfig,
}

/// Progress of a collection run
#[derive(Default)]
struct Scan {
    pages: Vec<Page>,
    visited: HashSet<usize>,
    seen: HashSet<PageKind>,
    other_count: usize,
}

impl<C> RelevantPageCollector<C>
where
    C: StructuredCompletion<Error = LlmError>,
{
    /// Create a collector
    pub fn new(client: C, config: PageCollectorConfig) -> Result<Self, ClassifierError> {
        config.validate().map_err(ClassifierError::Config)?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Classify the type of a single page
    pub fn classify_page(
        &self,
        text: &str,
        page_number: Option<u32>,
    ) -> Result<PageType, ClassifierError> {
        let messages = [ChatMessage::user(page_type_prompt(text, page_number))];
        let completion = self.client.complete::<PageType>(
            &self.config.model,
            &messages,
            self.config.max_retries,
        )?;
        Ok(completion.value)
    }

    /// Collect title, imprint and table-of-contents pages of `document`.
    ///
    /// Pages that cannot be extracted or classified are logged and skipped.
    pub fn collect<D>(&self, document: &D) -> Vec<Page>
    where
        D: DocumentPages,
        D::Error: Display,
    {
        let name = document.name();
        let page_count = document.page_count();
        let mut scan = Scan::default();

        debug!("{} - Scan for relevant content", name);
        for index in 0..page_count.min(self.config.max_front) {
            let Some(kind) = self.visit(document, index, &mut scan) else {
                continue;
            };
            if kind == PageKind::Other {
                scan.other_count += 1;
                if scan.other_count > self.config.max_other_pages {
                    debug!("{} - Too many unrelated pages, front scan stops", name);
                    break;
                }
            }
        }

        if !scan.seen.contains(&PageKind::Imprint) {
            debug!("{} - Scan backwards for imprint", name);
            for index in (0..page_count).rev().take(self.config.max_back) {
                if scan.seen.contains(&PageKind::Imprint) {
                    break;
                }
                if scan.visited.contains(&index) {
                    continue;
                }
                self.visit(document, index, &mut scan);
            }
        }

        info!("{} - Collected {} relevant pages", name, scan.pages.len());
        scan.pages
    }

    /// Extract and classify one page, recording it in `scan`.
    ///
    /// Returns the page kind, or `None` when the page was skipped.
    fn visit<D>(&self, document: &D, index: usize, scan: &mut Scan) -> Option<PageKind>
    where
        D: DocumentPages,
        D::Error: Display,
    {
        let name = document.name();
        scan.visited.insert(index);

        let content = match document.page_text(index) {
            Ok(content) => content,
            Err(e) => {
                error!("{} - Failed to extract page {}: {}", name, index, e);
                return None;
            }
        };
        if content.chars().count() < self.config.min_chars {
            debug!("{} - Skip page {}, less than {} chars", name, index, self.config.min_chars);
            return None;
        }

        let page_number = u32::try_from(index).ok();
        let page_type = match self.classify_page(&content, page_number) {
            Ok(page_type) => page_type,
            Err(e) => {
                error!("{} - Failed to classify page {}: {}", name, index, e);
                return None;
            }
        };

        let kind = page_type.page_type;
        debug!("{} - Page {} -> {:?}", name, index, kind);
        if kind.is_relevant() {
            scan.seen.insert(kind);
            scan.pages.push(Page { page_type, content });
        }
        Some(kind)
    }
}
