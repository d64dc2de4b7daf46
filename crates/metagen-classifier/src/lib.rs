//! Metagen Classifier
//!
//! Turns document text into Thema categories and bibliographic metadata
//! using a structured-completion capability.
//!
//! # Overview
//!
//! Classification walks the Thema hierarchy top-down. One selection call
//! picks up to three root categories; each of them is refined level by level
//! by asking the model to choose among the current category's children.
//! The deepest category reached on every branch is reported, together with
//! the exact total cost of all calls.
//!
//! # Architecture
//!
//! ```text
//! excerpt → ThemaClassifier → CategorySelector → StructuredCompletion → model
//!                 ↓
//!            ThemaIndex (shared, read-only)
//! ```
//!
//! # Key Features
//!
//! - **Recursive descent**: greedy per branch, first selection wins
//! - **Exact cost accounting**: every call's cost is summed into the result
//! - **Metadata generation**: one validated `BookMetadata` per document
//! - **Page collection**: finds title, imprint and contents pages
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use metagen_classifier::{ClassifierConfig, ThemaClassifier};
//! use metagen_domain::CategoryNode;
//! use metagen_llm::{MockProvider, StructuredClient};
//! use metagen_thema::ThemaIndex;
//!
//! let index = ThemaIndex::from_nodes(vec![
//!     CategoryNode::new("A", "The Arts"),
//!     CategoryNode::new("B", "Biography"),
//! ])
//! .unwrap();
//!
//! let llm = MockProvider::new(
//!     r#"{"categories": [{"reason": "art book", "category_code": "A",
//!         "category_heading": "The Arts", "confidence": "HIGH"}]}"#,
//! );
//! let classifier = ThemaClassifier::new(
//!     StructuredClient::new(llm),
//!     Arc::new(index),
//!     ClassifierConfig::default(),
//! )
//! .unwrap();
//!
//! let result = classifier.classify("A history of painting").unwrap();
//! assert_eq!(result.codes(), vec!["A"]);
//! ```

#![warn(missing_docs)]

mod config;
mod descent;
mod error;
mod metadata;
mod pages;
mod prompt;
mod selector;

#[cfg(test)]
mod tests;

pub use config::{
    ClassifierConfig, GeneratorConfig, PageCollectorConfig, DEFAULT_CLASSIFIER_SYSTEM_PROMPT,
    DEFAULT_GENERATOR_SYSTEM_PROMPT, DEFAULT_MAX_RETRIES, DEFAULT_MODEL,
};
pub use descent::ThemaClassifier;
pub use error::ClassifierError;
pub use metadata::MetadataGenerator;
pub use pages::RelevantPageCollector;
pub use prompt::{page_type_prompt, SelectionPrompt};
pub use selector::{CategorySelector, SelectionOutcome};
