//! Configuration management.
//!
//! Configuration is resolved once at startup from three layers, later layers
//! winning: built-in defaults, an optional TOML file, then environment
//! variables (`TWEETBINDER_API_BASE`, `TWEETBINDER_API_KEY`,
//! `TWEETBINDER_BEARER_TOKEN`, `TWEETBINDER_TIMEOUT_SECS`). The resolved
//! credential is turned into an [`Auth`] capability and injected into the
//! client; business logic never reads the environment.
//!
//! # Configuration File Format
//!
//! ```toml
//! api_base = "https://api.tweetbinder.com"
//! api_key = "your-api-key"
//! # or, depending on deployment:
//! # bearer_token = "your-token"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::Auth;

/// Default provider base URL.
pub const DEFAULT_API_BASE: &str = "https://api.tweetbinder.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key (query-parameter authentication scheme)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bearer token (Authorization-header authentication scheme)
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            bearer_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration: defaults, then the config file (the given path,
    /// or the default location if it exists), then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Overlay environment variables onto this configuration.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup("TWEETBINDER_API_BASE") {
            self.api_base = base;
        }
        if let Some(key) = lookup("TWEETBINDER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(token) = lookup("TWEETBINDER_BEARER_TOKEN") {
            self.bearer_token = Some(token);
        }
        if let Some(timeout) = lookup("TWEETBINDER_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.timeout_secs = secs;
            }
        }
    }

    /// Resolve the active credential scheme.
    ///
    /// Exactly one scheme is active per deployment; when both are configured
    /// the bearer token wins and a warning is logged. With neither, startup
    /// fails.
    pub fn auth(&self) -> Result<Auth, ConfigError> {
        match (&self.bearer_token, &self.api_key) {
            (Some(token), key) => {
                if key.is_some() {
                    tracing::warn!(
                        "both api_key and bearer_token are configured; using the bearer token"
                    );
                }
                Ok(Auth::Bearer(token.clone()))
            }
            (None, Some(key)) => Ok(Auth::ApiKey(key.clone())),
            (None, None) => Err(ConfigError::MissingCredentials),
        }
    }
}

/// Default config file location
/// (`<config dir>/tweetbinder-mcp/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tweetbinder-mcp").join("config.toml"))
}

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(
        "no credentials configured: set TWEETBINDER_API_KEY or TWEETBINDER_BEARER_TOKEN \
         (or api_key/bearer_token in the config file)"
    )]
    MissingCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_api() {
        let config = Config::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_none());
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn toml_file_fields_are_optional() {
        let config: Config = toml::from_str(r#"api_key = "abc""#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn env_overlays_file_values() {
        let mut config: Config =
            toml::from_str(r#"api_base = "https://staging.example.com""#).unwrap();
        config.apply_env_from(|name| match name {
            "TWEETBINDER_API_BASE" => Some("https://override.example.com".to_string()),
            "TWEETBINDER_API_KEY" => Some("env-key".to_string()),
            _ => None,
        });

        assert_eq!(config.api_base, "https://override.example.com");
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn auth_requires_some_credential() {
        let config = Config::default();
        assert!(matches!(
            config.auth(),
            Err(ConfigError::MissingCredentials)
        ));
    }

    #[test]
    fn auth_selects_the_configured_scheme() {
        let mut config = Config {
            api_key: Some("k".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.auth().unwrap(), Auth::ApiKey(_)));

        config.bearer_token = Some("t".to_string());
        assert!(matches!(config.auth().unwrap(), Auth::Bearer(_)));
    }
}
