//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use metagen_classifier::{ClassifierConfig, GeneratorConfig, PageCollectorConfig};
use metagen_llm::Pricing;
use metagen_thema::{ThemaSource, THEMA_JSON_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM connection settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Taxonomy source settings
    #[serde(default)]
    pub thema: ThemaSettings,

    /// Classification settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Metadata generation settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Page collection settings
    #[serde(default)]
    pub pages: PageCollectorConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Which chat backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Local Ollama server
    Ollama,
}

/// LLM connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Backend kind
    pub provider: Provider,

    /// Endpoint URL, the provider's default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key for OpenAI-compatible endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Transport attempts per request
    pub max_retries: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Context window for Ollama models
    pub num_ctx: u32,

    /// Token prices for deriving costs the endpoint does not report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

/// Taxonomy source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemaSettings {
    /// Local taxonomy file, `~/.metagen/thema.json` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,

    /// Download URL
    pub url: String,

    /// HTTP response cache directory, `~/.metagen/http_cache` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Download timeout (seconds)
    pub timeout_secs: u64,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Model for all calls
    pub model: Option<String>,
    /// Backend kind
    pub provider: Option<Provider>,
    /// Endpoint URL
    pub endpoint: Option<String>,
    /// API key
    pub api_key: Option<String>,
}

impl Config {
    /// Directory holding configuration and caches (`~/.metagen`).
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".metagen"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from the default file, or defaults if it does
    /// not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.classifier
            .validate()
            .map_err(|e| CliError::Config(format!("[classifier] {}", e)))?;
        self.generator
            .validate()
            .map_err(|e| CliError::Config(format!("[generator] {}", e)))?;
        self.pages
            .validate()
            .map_err(|e| CliError::Config(format!("[pages] {}", e)))?;
        Ok(())
    }

    /// Apply command-line and environment values on top of the file.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(model) = overrides.model {
            self.classifier.model = model.clone();
            self.generator.model = model.clone();
            self.pages.model = model;
        }
        if let Some(provider) = overrides.provider {
            self.llm.provider = provider;
        }
        if overrides.endpoint.is_some() {
            self.llm.endpoint = overrides.endpoint;
        }
        if overrides.api_key.is_some() {
            self.llm.api_key = overrides.api_key;
        }
    }

    /// Taxonomy source described by the `[thema]` section.
    pub fn thema_source(&self) -> Result<ThemaSource> {
        let local_path = match &self.thema.local_path {
            Some(path) => path.clone(),
            None => Self::home()?.join("thema.json"),
        };
        let cache_dir = match &self.thema.cache_dir {
            Some(dir) => dir.clone(),
            None => Self::home()?.join("http_cache"),
        };
        Ok(ThemaSource::new(local_path, cache_dir)
            .with_url(self.thema.url.as_str())
            .with_timeout(Duration::from_secs(self.thema.timeout_secs)))
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Openai,
            endpoint: None,
            api_key: None,
            timeout_secs: 120,
            max_retries: 3,
            temperature: 0.4,
            num_ctx: 8192,
            pricing: None,
        }
    }
}

impl Default for ThemaSettings {
    fn default() -> Self {
        Self {
            local_path: None,
            url: THEMA_JSON_URL.to_string(),
            cache_dir: None,
            timeout_secs: 60,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
