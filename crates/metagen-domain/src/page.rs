//! Page selection and page-type classification

use crate::confidence::Confidence;
use crate::traits::{DocumentPages, ResponseShape};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Marker placed between pages in an excerpt
pub const PAGE_SEPARATOR: &str = "\n\n-----\n\n";

/// Which pages of a document make up an excerpt.
///
/// Books carry their metadata at the edges (title page, imprint, back
/// cover), so excerpts sample the front, optionally the middle, and the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelection {
    /// Pages taken from the start
    pub front: usize,
    /// Pages taken from the middle, starting at `page_count / 2`
    pub middle: usize,
    /// Pages taken from the end
    pub back: usize,
}

impl PageSelection {
    /// Selection used for bibliographic metadata
    pub const METADATA: PageSelection = PageSelection { front: 8, middle: 0, back: 3 };

    /// Selection used for subject classification
    pub const CLASSIFICATION: PageSelection = PageSelection { front: 8, middle: 3, back: 3 };

    /// Create a selection
    pub fn new(front: usize, middle: usize, back: usize) -> Self {
        Self { front, middle, back }
    }

    /// Zero-based page indices for a document with `page_count` pages.
    ///
    /// Indices are unique, ascending and always `< page_count`, so short
    /// documents where the ranges overlap yield each page once.
    pub fn select_pages(&self, page_count: usize) -> Vec<usize> {
        let mut pages = BTreeSet::new();
        pages.extend(0..self.front.min(page_count));

        let center = page_count / 2;
        pages.extend((center..center.saturating_add(self.middle)).take_while(|&p| p < page_count));

        pages.extend(page_count.saturating_sub(self.back)..page_count);
        pages.into_iter().collect()
    }
}

/// Concatenate the selected pages of `document` into one excerpt
pub fn extract_excerpt<D: DocumentPages>(
    document: &D,
    selection: PageSelection,
) -> Result<String, D::Error> {
    let pages = selection.select_pages(document.page_count());
    let mut texts = Vec::with_capacity(pages.len());
    for index in pages {
        texts.push(document.page_text(index)?);
    }
    Ok(texts.join(PAGE_SEPARATOR))
}

/// Kind of a book page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageKind {
    /// Title page
    TitlePage,
    /// Imprint / copyright page
    Imprint,
    /// Table of contents
    TableOfContents,
    /// Anything else
    Other,
}

impl PageKind {
    /// Whether pages of this kind carry metadata worth collecting
    pub fn is_relevant(&self) -> bool {
        !matches!(self, PageKind::Other)
    }
}

/// Classify the page-type of a book page. Also take note of the page-number
/// when predicting the page type. For example, it is quite unlikely that
/// page 0 is an IMPRINT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageType {
    /// The chain of thought that led to the prediction
    pub chain_of_thought: String,
    /// The predicted page type
    pub page_type: PageKind,
    /// The confidence score of your prediction
    pub confidence: Confidence,
    /// The page number
    pub page_number: u32,
}

impl ResponseShape for PageType {
    const NAME: &'static str = "PageType";
}

/// A collected page with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Classification of the page
    pub page_type: PageType,
    /// Markdown representation of the page's textual content
    pub content: String,
}
