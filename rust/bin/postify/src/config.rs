//! Client configuration.
//!
//! Reads `~/.postify/config.toml`:
//!
//! ```toml
//! [content]
//! base_url = "https://cms.example.com"
//! api_key = "..."
//!
//! [search]
//! delay_ms = 300
//! limit = 3
//! ```

use std::path::{Path, PathBuf};

use postify_content::ContentConfig;
use postify_search::SearchConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl ClientConfig {
    /// Default config file path: ~/.postify/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    /// `PAYLOAD_URL` / `PAYLOAD_API` override the file either way.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::load_file(path)?.with_env_overrides())
    }

    fn load_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.content = self.content.with_env_overrides();
        self
    }
}

/// Return the Postify config directory (~/.postify).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".postify")
}
