//! Configuration structures for the relay and its CLI client.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{InvreadError, Result};

/// Vision Parser endpoint for image and PDF files.
pub const VISION_PARSER_API_URL: &str = "https://api.visionparser.com/parse/image/file";

/// Upload size cap (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Main configuration for invread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvreadConfig {
    /// Upload relay configuration.
    pub relay: RelayConfig,

    /// CLI client configuration.
    pub client: ClientConfig,
}

/// Upload relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Socket address the relay listens on.
    pub bind_address: String,

    /// Remote extraction endpoint.
    pub upstream_url: String,

    /// Environment variable holding the provider API key.
    pub api_key_env: String,

    /// Directory for staged uploads, created on demand.
    pub upload_dir: PathBuf,

    /// Maximum accepted file size in bytes.
    pub max_upload_bytes: u64,

    /// Skip TLS certificate validation for the upstream call.
    pub accept_invalid_certs: bool,

    /// Upstream request timeout. `None` keeps the transport default.
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            upstream_url: VISION_PARSER_API_URL.to_string(),
            api_key_env: "VISION_PARSER_API_KEY".to_string(),
            upload_dir: PathBuf::from("tmp"),
            max_upload_bytes: MAX_FILE_SIZE,
            accept_invalid_certs: false,
            upstream_timeout_secs: None,
        }
    }
}

impl RelayConfig {
    /// Read the provider API key from the configured environment variable.
    ///
    /// Empty values count as unset.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// CLI client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of the relay endpoint.
    pub relay_url: String,

    /// Size above which the CLI warns before uploading.
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://localhost:3000/api/parse-invoice".to_string(),
            max_upload_bytes: MAX_FILE_SIZE,
        }
    }
}

impl InvreadConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvreadError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
