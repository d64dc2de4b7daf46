//! Configuration for classification, metadata generation and page collection

use serde::{Deserialize, Serialize};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default retry budget handed to the completion capability
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// System message framing the category selection calls
pub const DEFAULT_CLASSIFIER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that selects Thema categories for books.";

/// System message framing the metadata generation call
pub const DEFAULT_GENERATOR_SYSTEM_PROMPT: &str =
    "You are a Metadata expert responsible for collecting comprehensive and precise metadata!";

/// Configuration for the Thema classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model used for every selection call
    pub model: String,

    /// Retry budget per selection call
    pub max_retries: u32,

    /// Number of categories each selection prompt asks for at most
    pub max_selections_per_call: usize,

    /// Maximum categories in the final result
    pub max_categories: usize,

    /// Descend top-level branches on separate threads
    pub parallel_branches: bool,

    /// A failed child-level call ends only its own branch instead of
    /// failing the whole request
    pub isolate_branch_failures: bool,

    /// System message for selection calls
    pub system_prompt: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_selections_per_call: 3,
            max_categories: 4,
            parallel_branches: false,
            isolate_branch_failures: false,
            system_prompt: DEFAULT_CLASSIFIER_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_selections_per_call == 0 {
            return Err("max_selections_per_call must be greater than 0".to_string());
        }
        if self.max_categories == 0 {
            return Err("max_categories must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Configuration for the metadata generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Model used unless the caller overrides it
    pub model: String,

    /// Retry budget unless the caller overrides it
    pub max_retries: u32,

    /// System message for the generation call
    pub system_prompt: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            system_prompt: DEFAULT_GENERATOR_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Configuration for the relevant page collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageCollectorConfig {
    /// Model used for page classification
    pub model: String,

    /// Retry budget per page classification
    pub max_retries: u32,

    /// Pages scanned from the front of the document
    pub max_front: usize,

    /// Pages scanned backwards from the end when no imprint was found
    pub max_back: usize,

    /// Pages with less text than this are skipped
    pub min_chars: usize,

    /// The forward scan stops once more than this many OTHER pages were seen
    pub max_other_pages: usize,
}

impl Default for PageCollectorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_front: 20,
            max_back: 10,
            min_chars: 5,
            max_other_pages: 8,
        }
    }
}

impl PageCollectorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_front == 0 && self.max_back == 0 {
            return Err("max_front and max_back cannot both be 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_are_valid() {
        assert!(ClassifierConfig::default().validate().is_ok());
        assert!(GeneratorConfig::default().validate().is_ok());
        assert!(PageCollectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_classifier_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.max_selections_per_call, 3);
        assert_eq!(config.max_categories, 4);
        assert!(!config.parallel_branches);
        assert!(!config.isolate_branch_failures);
    }

    #[test]
    fn test_invalid_max_categories() {
        let config = ClassifierConfig {
            max_categories: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_model_is_invalid() {
        let config = GeneratorConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config =
            ClassifierConfig::from_toml("model = \"ollama/llama3\"\nparallel_branches = true")
                .unwrap();
        assert_eq!(config.model, "ollama/llama3");
        assert!(config.parallel_branches);
        assert_eq!(config.max_categories, 4);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PageCollectorConfig {
            max_front: 12,
            ..Default::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = PageCollectorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_bad_toml_is_reported() {
        assert!(ClassifierConfig::from_toml("max_categories = \"four\"").is_err());
    }
}
