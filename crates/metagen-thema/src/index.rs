//! Read-only Thema index
//!
//! All lookup structures are built eagerly at construction so that the
//! index can be shared across threads without interior mutability.

use crate::error::ThemaError;
use crate::parse::{parse_codes, resolve_ancestry};
use crate::source::ThemaSource;
use metagen_domain::{is_root_code, CategoryNode};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

/// The loaded taxonomy with code lookup, roots and parent to children links
#[derive(Debug, Clone)]
pub struct ThemaIndex {
    nodes: Vec<CategoryNode>,
    positions: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
}

impl ThemaIndex {
    /// Build an index from nodes in load order.
    ///
    /// Runs the ancestry pass, so `full_heading` is recomputed and duplicate
    /// codes or cycles are rejected.
    pub fn from_nodes(nodes: Vec<CategoryNode>) -> Result<Self, ThemaError> {
        let nodes = resolve_ancestry(nodes)?;
        Ok(Self::build(nodes))
    }

    /// Build an index from raw Thema JSON
    pub fn from_raw(raw: &Value) -> Result<Self, ThemaError> {
        let nodes = parse_codes(raw)?;
        Ok(Self::build(nodes))
    }

    /// Load raw data from `source` and build the index
    pub fn load(source: &ThemaSource) -> Result<Self, ThemaError> {
        let raw = source.load()?;
        let index = Self::from_raw(&raw)?;
        info!(
            "Thema index ready: {} codes, {} roots",
            index.len(),
            index.roots.len()
        );
        Ok(index)
    }

    fn build(nodes: Vec<CategoryNode>) -> Self {
        let mut positions = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();

        for (idx, node) in nodes.iter().enumerate() {
            positions.insert(node.code.clone(), idx);
            if is_root_code(&node.code) {
                roots.push(idx);
            }
            if node.has_parent() && node.parent_code != node.code {
                children.entry(node.parent_code.clone()).or_default().push(idx);
            }
        }

        Self {
            nodes,
            positions,
            children,
            roots,
        }
    }

    /// Look up a node by its code
    pub fn by_code(&self, code: &str) -> Option<&CategoryNode> {
        self.positions.get(code).map(|&idx| &self.nodes[idx])
    }

    /// Top-level categories in load order
    pub fn root_categories(&self) -> Vec<&CategoryNode> {
        self.roots.iter().map(|&idx| &self.nodes[idx]).collect()
    }

    /// Direct children of `node` in load order, never including `node` itself
    pub fn children_of(&self, node: &CategoryNode) -> Vec<&CategoryNode> {
        self.children_of_code(&node.code)
    }

    /// Direct children of the node with `code`.
    ///
    /// Unknown codes have no children.
    pub fn children_of_code(&self, code: &str) -> Vec<&CategoryNode> {
        self.children
            .get(code)
            .map(|indices| indices.iter().map(|&idx| &self.nodes[idx]).collect())
            .unwrap_or_default()
    }

    /// Number of codes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index holds no codes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in load order
    pub fn iter(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes.iter()
    }
}
