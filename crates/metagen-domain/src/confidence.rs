//! Model-reported confidence levels

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How confident the model is in a prediction.
///
/// Serialized in upper case (`"LOW"`, `"MEDIUM"`, `"HIGH"`), which is the
/// vocabulary the prompts and schemas expose to the model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    /// Weak evidence
    Low,
    /// Reasonable evidence
    Medium,
    /// Strong evidence
    High,
}

impl Confidence {
    /// Wire name of the level
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
