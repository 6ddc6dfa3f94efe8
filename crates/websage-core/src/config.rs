use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WebsageError};

/// Top-level configuration for the Websage application.
///
/// Loaded from `~/.websage/config.toml` by default. Credentials are not
/// part of this file; they come from the environment (see
/// [`Credentials`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebsageConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl WebsageConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WebsageConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if
    /// the file does not exist or cannot be parsed.
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
            toml::to_string_pretty(self).map_err(|e| WebsageError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Web-search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Custom Search JSON API endpoint.
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
        }
    }
}

/// Language-model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Generative Language API base endpoint.
    pub endpoint: String,
    /// Model variants tried in priority order.
    pub variants: Vec<String>,
    /// Seconds to wait before the next variant after a rate limit.
    pub rate_limit_delay_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            variants: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-2.5-pro".to_string(),
                "gemini-2.5-flash-lite".to_string(),
            ],
            rate_limit_delay_secs: 2,
        }
    }
}

/// Required API credentials, read from the environment.
///
/// All three must be present at startup; a missing or blank value is a
/// fatal condition and nothing else runs.
#[derive(Clone)]
pub struct Credentials {
    /// Key for the language-model provider.
    pub model_api_key: String,
    /// Key for the web-search provider.
    pub search_api_key: String,
    /// Search engine identifier (the `cx` parameter).
    pub search_engine_id: String,
}

impl Credentials {
    pub const MODEL_KEY_VAR: &'static str = "GEMINI_API_KEY";
    pub const SEARCH_KEY_VAR: &'static str = "GOOGLE_API_KEY";
    pub const ENGINE_ID_VAR: &'static str = "GOOGLE_CSE_ID";

    /// Read all required credentials from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            model_api_key: require(Self::MODEL_KEY_VAR)?,
            search_api_key: require(Self::SEARCH_KEY_VAR)?,
            search_engine_id: require(Self::ENGINE_ID_VAR)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(WebsageError::MissingCredential(name.to_string())),
    }
}
