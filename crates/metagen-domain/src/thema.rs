//! Thema subject categories and classification results

use crate::confidence::Confidence;
use crate::cost::Cost;
use crate::traits::ResponseShape;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Separator between headings in a [`CategoryNode::full_heading`]
pub const HEADING_SEPARATOR: &str = " / ";

/// Whether a code names a top-level category.
///
/// Thema roots are the single-letter codes (`A`, `B`, ...). This is a
/// convention of the taxonomy, not something the parent links encode.
pub fn is_root_code(code: &str) -> bool {
    let mut chars = code.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

/// A single Thema category.
///
/// Nodes are created by the taxonomy loader and never mutated after the
/// ancestry pass has filled in `full_heading`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// Unique category code (e.g. `"ABA"`)
    pub code: String,

    /// Descriptive heading
    pub heading: String,

    /// Usage notes, may be empty
    #[serde(default)]
    pub notes: String,

    /// Code of the parent category, empty for roots
    #[serde(default)]
    pub parent_code: String,

    /// Thema issue in which the code was introduced
    #[serde(default)]
    pub issue_number: String,

    /// Thema version in which the code was last modified
    #[serde(default)]
    pub modified: String,

    /// Headings from the root ancestor down to this node, joined by `" / "`
    #[serde(default)]
    pub full_heading: String,
}

impl CategoryNode {
    /// Create a node without parent or notes.
    ///
    /// `full_heading` starts out as the node's own heading.
    pub fn new(code: impl Into<String>, heading: impl Into<String>) -> Self {
        let heading = heading.into();
        Self {
            code: code.into(),
            full_heading: heading.clone(),
            heading,
            notes: String::new(),
            parent_code: String::new(),
            issue_number: String::new(),
            modified: String::new(),
        }
    }

    /// Set the parent code
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = parent_code.into();
        self
    }

    /// Set the usage notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether this is a top-level category
    pub fn is_root(&self) -> bool {
        is_root_code(&self.code)
    }

    /// Whether the node names a parent at all
    pub fn has_parent(&self) -> bool {
        !self.parent_code.is_empty()
    }

}

/// A Thema category relevant to a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategorySelection {
    /// Reason for selection
    pub reason: String,

    /// Category code
    #[serde(rename = "category_code")]
    pub code: String,

    /// Category heading
    #[serde(rename = "category_heading")]
    pub heading: String,

    /// How confident you are that the selected category is relevant
    pub confidence: Confidence,
}

impl CategorySelection {
    /// Create a selection
    pub fn new(
        code: impl Into<String>,
        heading: impl Into<String>,
        reason: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            code: code.into(),
            heading: heading.into(),
            reason: reason.into(),
            confidence,
        }
    }
}

/// A list of Thema categories relevant to the document, most relevant first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategorySelections {
    /// Selected categories, most relevant first
    pub categories: Vec<CategorySelection>,
}

impl ResponseShape for CategorySelections {
    const NAME: &'static str = "ThemaCategories";

    fn validate(&self) -> Result<(), String> {
        for (idx, selection) in self.categories.iter().enumerate() {
            if selection.code.trim().is_empty() {
                return Err(format!("categories[{}].category_code is empty", idx));
            }
        }
        Ok(())
    }
}

/// Final outcome of one classification request.
///
/// Built once when the traversal ends; there are no mutators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    selections: Vec<CategorySelection>,
    total_cost: Cost,
}

impl CategoryResult {
    /// Create a result
    pub fn new(selections: Vec<CategorySelection>, total_cost: Cost) -> Self {
        Self {
            selections,
            total_cost,
        }
    }

    /// Deepest category per branch, in top-level order
    pub fn selections(&self) -> &[CategorySelection] {
        &self.selections
    }

    /// Sum of every completion call made for the request
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// Codes of the selections, in order
    pub fn codes(&self) -> Vec<&str> {
        self.selections.iter().map(|s| s.code.as_str()).collect()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Take the selections out
    pub fn into_selections(self) -> Vec<CategorySelection> {
        self.selections
    }
}
