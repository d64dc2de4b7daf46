//! Metagen Thema Taxonomy
//!
//! Loads the EDItEUR Thema subject-category scheme and exposes it as a
//! read-only index for classification.
//!
//! # Architecture
//!
//! - [`ThemaSource`]: local cache file first, remote JSON (with an on-disk
//!   HTTP response cache) as fallback
//! - [`parse_codes`]: raw JSON to [`CategoryNode`]s, including the ancestry
//!   pass that fills in full headings and rejects cyclic parent chains
//! - [`ThemaIndex`]: lookup by code, root enumeration, parent to children
//!
//! The index is built once per process and shared read-only (wrap it in an
//! `Arc`) across concurrent classification requests.
//!
//! # Examples
//!
//! ```
//! use metagen_domain::CategoryNode;
//! use metagen_thema::ThemaIndex;
//!
//! let index = ThemaIndex::from_nodes(vec![
//!     CategoryNode::new("A", "The Arts"),
//!     CategoryNode::new("AB", "The arts: general topics").with_parent("A"),
//! ])
//! .unwrap();
//!
//! let arts = index.by_code("A").unwrap();
//! assert_eq!(index.children_of(arts)[0].full_heading, "The Arts / The arts: general topics");
//! ```

#![warn(missing_docs)]

mod error;
mod index;
mod parse;
mod source;

pub use error::ThemaError;
pub use index::ThemaIndex;
pub use metagen_domain::CategoryNode;
pub use parse::{parse_codes, resolve_ancestry};
pub use source::{save_raw, ThemaSource};

/// Thema version loaded by default
pub const THEMA_VERSION: &str = "1.5";

/// Download location of the default Thema version
pub const THEMA_JSON_URL: &str =
    "https://www.editeur.org/files/Thema/1.5/v1.5_en/20230707_Thema_v1.5_en.json";
