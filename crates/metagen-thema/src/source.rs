//! Where raw Thema data comes from
//!
//! A local JSON file is tried first. If it is missing or broken the remote
//! EDItEUR file is used, going through an on-disk response cache keyed by
//! the SHA-256 of the URL. A cached response is always reused.

use crate::error::ThemaError;
use crate::THEMA_JSON_URL;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for the remote download
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Location of the raw taxonomy data
#[derive(Debug, Clone)]
pub struct ThemaSource {
    local_path: PathBuf,
    url: String,
    http_cache_dir: PathBuf,
    timeout: Duration,
}

impl ThemaSource {
    /// Local file plus the default remote URL, caching responses in
    /// `http_cache_dir`
    pub fn new(local_path: impl Into<PathBuf>, http_cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            url: THEMA_JSON_URL.to_string(),
            http_cache_dir: http_cache_dir.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a different remote URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the download timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The local cache file
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// The remote URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// File holding the cached HTTP response for the remote URL
    pub fn http_cache_path(&self) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        let id = hex::encode(hasher.finalize());
        self.http_cache_dir.join(format!("{}.json", id))
    }

    /// Load raw Thema JSON, local file first.
    ///
    /// # Errors
    ///
    /// `SourceUnavailable` carrying both failure reasons when neither the
    /// local file nor the remote source yields valid JSON.
    pub fn load(&self) -> Result<Value, ThemaError> {
        let local_error = match read_json(&self.local_path) {
            Ok(raw) => {
                info!("Loaded Thema data from {}", self.local_path.display());
                return Ok(raw);
            }
            Err(e) => {
                warn!(
                    "Local Thema file {} unusable ({}), falling back to {}",
                    self.local_path.display(),
                    e,
                    self.url
                );
                e
            }
        };

        self.load_remote()
            .map_err(|remote_error| ThemaError::SourceUnavailable {
                local: local_error.to_string(),
                remote: remote_error.to_string(),
            })
    }

    /// Load raw Thema JSON from the remote URL (or its cached response)
    pub fn load_remote(&self) -> Result<Value, ThemaError> {
        let cache = self.http_cache_path();
        if cache.exists() {
            match read_json(&cache) {
                Ok(raw) => {
                    debug!("Using cached response {}", cache.display());
                    return Ok(raw);
                }
                Err(e) => warn!("Ignoring corrupt cached response {}: {}", cache.display(), e),
            }
        }

        info!("Downloading Thema data from {}", self.url);
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let body = client.get(&self.url).send()?.error_for_status()?.text()?;
        let raw: Value = serde_json::from_str(strip_bom(&body))?;

        if let Some(parent) = cache.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&cache, &body)?;
        Ok(raw)
    }
}

/// Write raw Thema JSON compactly, creating parent directories
pub fn save_raw(raw: &Value, path: &Path) -> Result<(), ThemaError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec(raw)?)?;
    info!("Saved Thema data to {}", path.display());
    Ok(())
}

fn read_json(path: &Path) -> Result<Value, ThemaError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(strip_bom(&text))?)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
