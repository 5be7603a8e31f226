use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MnemoError, Result};

/// Top-level configuration for the mnemo agent.
///
/// Loaded from a TOML file. Each section corresponds to one concern of the
/// pipeline; missing sections and fields fall back to their defaults so a
/// partial config file is always usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MnemoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for MnemoConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl MnemoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MnemoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MnemoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where memory artifacts (content + index pairs) are stored.
    pub storage_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            storage_dir: "./memories".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Retrieval fan-out and merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Results requested from each registered memory.
    pub per_source_top_k: usize,
    /// Maximum merged results kept after the global sort.
    pub max_merged: usize,
    /// Top results handed to context assembly.
    pub context_chunks: usize,
    /// Per-memory search timeout in seconds.
    pub handle_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            per_source_top_k: 5,
            max_merged: 10,
            context_chunks: 5,
            handle_timeout_secs: 10,
        }
    }
}

/// Generation provider settings.
///
/// Credentials are never stored here; they come from environment variables
/// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GOOGLE_API_KEY`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Preferred provider: "openai", "anthropic", or "google".
    /// `None` selects the first provider with credentials available.
    pub provider: Option<String>,
    /// Model name override. `None` uses the provider default.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            temperature: 0.7,
        }
    }
}
