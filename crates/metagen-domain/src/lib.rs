//! Metagen Domain Layer
//!
//! Core value types and boundary traits for bibliographic metadata extraction
//! and Thema subject classification. Infrastructure (LLM backends, taxonomy
//! loading, PDF text extraction) lives in other crates and plugs in through
//! the traits defined here.
//!
//! ## Key Concepts
//!
//! - **CategoryNode**: one Thema subject category with its derived full heading
//! - **CategorySelection**: a category picked by the model for a document
//! - **CategoryResult**: the final, cost-annotated classification
//! - **BookMetadata**: the primary bibliographic record
//! - **Cost**: exact decimal accounting of model spend
//! - **StructuredCompletion**: the "prompt + schema → validated object" capability

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod cost;
pub mod metadata;
pub mod page;
pub mod thema;
pub mod traits;

// Re-exports for convenience
pub use confidence::Confidence;
pub use cost::Cost;
pub use metadata::{BookIsbn, BookMetadata, Contributor};
pub use page::{extract_excerpt, Page, PageKind, PageSelection, PageType};
pub use thema::{is_root_code, CategoryNode, CategoryResult, CategorySelection, CategorySelections};
pub use traits::{ChatMessage, Completion, DocumentPages, ResponseShape, Role, StructuredCompletion};
