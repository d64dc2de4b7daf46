//! PDF text extraction using the `pdf-extract` crate.
//!
//! `pdf-extract` returns the whole document as one string with a form feed
//! (`\x0C`) between pages; the text is split on those into pages once, at
//! load time.

use crate::error::{CliError, Result};
use metagen_domain::DocumentPages;
use std::path::Path;
use tracing::debug;

const PAGE_BREAK: char = '\x0C';

/// A PDF loaded as per-page text.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    name: String,
    pages: Vec<String>,
}

impl PdfDocument {
    /// Read and extract the PDF at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &data)
    }

    /// Extract a PDF held in memory.
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let name = name.into();
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| CliError::Pdf(format!("{}: {}", name, e)))?;
        let document = Self::from_text(name, &text);
        debug!("{} - Extracted {} pages", document.name, document.pages.len());
        Ok(document)
    }

    /// Build a document from already extracted text.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        // A trailing page break does not open another page
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self {
            name: name.into(),
            pages,
        }
    }
}

impl DocumentPages for PdfDocument {
    type Error = CliError;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.pages.get(index).map(|p| p.trim().to_string()).ok_or_else(|| {
            CliError::InvalidInput(format!(
                "{} has {} pages, no page {}",
                self.name,
                self.pages.len(),
                index
            ))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let doc = PdfDocument::from_text("book.pdf", "Title\x0C Copyright 2001 \x0CChapter 1\x0C");

        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_text(1).unwrap(), "Copyright 2001");
        assert_eq!(doc.name(), "book.pdf");
    }

    #[test]
    fn test_text_without_breaks_is_one_page() {
        let doc = PdfDocument::from_text("flat.pdf", "just one page");
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_out_of_range_page() {
        let doc = PdfDocument::from_text("book.pdf", "a\x0Cb");
        assert!(matches!(doc.page_text(5), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_pdf_bytes() {
        let result = PdfDocument::from_bytes("broken.pdf", b"not a pdf");
        assert!(matches!(result, Err(CliError::Pdf(_))));
    }
}
