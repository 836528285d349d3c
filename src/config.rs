//! Web API connection settings.
//!
//! Loaded from `~/.mca/config.json`, with environment variables taking
//! precedence (`MCA_BASE_URL`, `MCA_API_VERSION`, `MCA_ACCESS_TOKEN`) so
//! registration tooling and CI can point at other orgs without touching the
//! file. Authentication itself is the host's concern; this only carries the
//! token the host already issued.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,
    #[error("Config not found at {0}")]
    NotFound(PathBuf),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebApiConfig {
    /// Organization root, e.g. `https://org.example.com`.
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub access_token: String,
}

fn default_api_version() -> String {
    "v9.2".to_string()
}

impl WebApiConfig {
    /// Default config path: `~/.mca/config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".mca").join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let mut config: WebApiConfig = serde_json::from_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the default path, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(&Self::default_path()?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("MCA_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(version) = std::env::var("MCA_API_VERSION") {
            self.api_version = version;
        }
        if let Ok(token) = std::env::var("MCA_ACCESS_TOKEN") {
            self.access_token = token;
        }
    }
}
