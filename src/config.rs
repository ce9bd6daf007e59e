//! Configuration file parser for ~/.config/snaply/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! API keys may live here or in the environment; the environment wins so a
//! shared config file never has to carry credentials.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable override for the photo search access key.
pub const SEARCH_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";
/// Environment variable override for the identity provider API key.
pub const AUTH_KEY_ENV: &str = "SNAPLY_AUTH_KEY";
/// Environment variable override for the image generation API key.
pub const GENERATION_KEY_ENV: &str = "SNAPLY_GENERATION_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// The custom Debug impl masks the three API keys so they never leak into
/// logs or error messages.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Query issued automatically when the grid first opens.
    pub default_query: String,

    /// Photo search API access key (env var takes precedence).
    pub search_access_key: Option<String>,

    /// Identity provider API key (env var takes precedence).
    pub auth_api_key: Option<String>,

    /// Image generation API key (env var takes precedence).
    pub generation_api_key: Option<String>,

    /// Override for the photo search API base URL (testing / proxies).
    pub search_base_url: Option<String>,

    /// Override for the identity provider base URL.
    pub auth_base_url: Option<String>,

    /// Override for the image generation base URL.
    pub generation_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            default_query: "music".to_string(),
            search_access_key: None,
            auth_api_key: None,
            generation_api_key: None,
            search_base_url: None,
            auth_base_url: None,
            generation_base_url: None,
        }
    }
}

/// Mask credentials in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("theme", &self.theme)
            .field("default_query", &self.default_query)
            .field(
                "search_access_key",
                &self.search_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "auth_api_key",
                &self.auth_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "generation_api_key",
                &self.generation_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("search_base_url", &self.search_base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("generation_base_url", &self.generation_base_url)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning (likely typos)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to bound memory use on a corrupted file
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        Self::warn_unknown_keys(&content);

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Warn about keys that don't match any known field (likely typos).
    fn warn_unknown_keys(content: &str) {
        const KNOWN_KEYS: [&str; 8] = [
            "theme",
            "default_query",
            "search_access_key",
            "auth_api_key",
            "generation_api_key",
            "search_base_url",
            "auth_base_url",
            "generation_base_url",
        ];
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown config key (typo?)");
                }
            }
        }
    }

    /// Photo search access key: environment first, then config file.
    pub fn search_key(&self) -> Option<SecretString> {
        key_from(SEARCH_KEY_ENV, self.search_access_key.as_deref())
    }

    /// Identity provider API key: environment first, then config file.
    pub fn auth_key(&self) -> Option<SecretString> {
        key_from(AUTH_KEY_ENV, self.auth_api_key.as_deref())
    }

    /// Image generation API key: environment first, then config file.
    pub fn generation_key(&self) -> Option<SecretString> {
        key_from(GENERATION_KEY_ENV, self.generation_api_key.as_deref())
    }
}

fn key_from(env_var: &str, config_value: Option<&str>) -> Option<SecretString> {
    if let Ok(v) = std::env::var(env_var) {
        if !v.trim().is_empty() {
            return Some(SecretString::from(v));
        }
    }
    config_value
        .filter(|v| !v.trim().is_empty())
        .map(|v| SecretString::from(v.to_string()))
}
