//! Parse raw Thema JSON into category nodes

use crate::error::ThemaError;
use metagen_domain::thema::HEADING_SEPARATOR;
use metagen_domain::CategoryNode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// One entry of `CodeList.ThemaCodes.Code`
#[derive(Deserialize)]
struct RawCode {
    #[serde(rename = "CodeValue", deserialize_with = "string_or_number")]
    code: String,
    #[serde(rename = "CodeDescription", deserialize_with = "string_or_number")]
    heading: String,
    #[serde(rename = "CodeNotes", default, deserialize_with = "string_or_number")]
    notes: String,
    #[serde(rename = "CodeParent", default, deserialize_with = "string_or_number")]
    parent_code: String,
    #[serde(rename = "IssueNumber", default, deserialize_with = "string_or_number")]
    issue_number: String,
    #[serde(rename = "Modified", default, deserialize_with = "string_or_number")]
    modified: String,
}

/// Thema JSON mixes numbers and strings for some fields
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

impl From<RawCode> for CategoryNode {
    fn from(raw: RawCode) -> Self {
        CategoryNode {
            full_heading: raw.heading.clone(),
            code: raw.code,
            heading: raw.heading,
            notes: raw.notes,
            parent_code: raw.parent_code,
            issue_number: raw.issue_number,
            modified: raw.modified,
        }
    }
}

/// Parse Thema codes from raw JSON data.
///
/// Expects the EDItEUR layout `{"CodeList": {"ThemaCodes": {"Code": [...]}}}`.
/// The returned nodes are in source order with `full_heading` computed.
///
/// # Errors
///
/// - `InvalidFormat` if the code list is missing or an entry is malformed
/// - `DataIntegrity` on duplicate codes or cyclic parent chains
pub fn parse_codes(raw: &Value) -> Result<Vec<CategoryNode>, ThemaError> {
    let start = Instant::now();

    let codes = raw
        .pointer("/CodeList/ThemaCodes/Code")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ThemaError::InvalidFormat("missing CodeList.ThemaCodes.Code array".to_string())
        })?;

    let mut nodes = Vec::with_capacity(codes.len());
    for (idx, entry) in codes.iter().enumerate() {
        let raw_code = RawCode::deserialize(entry)
            .map_err(|e| ThemaError::InvalidFormat(format!("code entry {}: {}", idx, e)))?;
        nodes.push(CategoryNode::from(raw_code));
    }

    let nodes = resolve_ancestry(nodes)?;

    info!(
        "Parsed {} Thema codes in {} ms",
        nodes.len(),
        start.elapsed().as_millis()
    );
    Ok(nodes)
}

/// Check code uniqueness and compute every node's `full_heading`.
///
/// The ancestor walk for each node stops at a root, at a parent code that
/// does not resolve (orphan), or at a node naming itself as parent. A walk
/// longer than the taxonomy size can only mean a cycle and fails with
/// `DataIntegrity`.
pub fn resolve_ancestry(mut nodes: Vec<CategoryNode>) -> Result<Vec<CategoryNode>, ThemaError> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if positions.insert(node.code.as_str(), idx).is_some() {
            return Err(ThemaError::DataIntegrity(format!(
                "duplicate category code '{}'",
                node.code
            )));
        }
    }

    let max_hops = nodes.len() + 1;
    let headings = (0..nodes.len())
        .map(|idx| full_heading(&nodes, &positions, idx, max_hops))
        .collect::<Result<Vec<_>, _>>()?;
    drop(positions);

    for (node, heading) in nodes.iter_mut().zip(headings) {
        node.full_heading = heading;
    }
    Ok(nodes)
}

fn full_heading(
    nodes: &[CategoryNode],
    positions: &HashMap<&str, usize>,
    start: usize,
    max_hops: usize,
) -> Result<String, ThemaError> {
    let mut current = &nodes[start];
    let mut chain = vec![current.heading.as_str()];
    let mut hops = 0;

    while current.has_parent() {
        if current.parent_code == current.code {
            debug!("Code '{}' names itself as parent, treating it as a root", current.code);
            break;
        }
        let Some(&parent) = positions.get(current.parent_code.as_str()) else {
            debug!(
                "Code '{}' has unknown parent '{}', ancestry stops here",
                current.code, current.parent_code
            );
            break;
        };

        hops += 1;
        if hops > max_hops {
            return Err(ThemaError::DataIntegrity(format!(
                "cyclic parent chain starting at code '{}'",
                nodes[start].code
            )));
        }
        current = &nodes[parent];
        chain.push(current.heading.as_str());
    }

    chain.reverse();
    Ok(chain.join(HEADING_SEPARATOR))
}
