//! Configuration module
//!
//! Handles loading and managing configuration.
//!
//! Precedence, lowest first: built-in defaults, config file, environment
//! variables, command-line flags.

mod env;
mod file;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::executor::DEFAULT_PACING_MS;
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::models::{EndpointConfig, Provider, DEFAULT_BASE_URL, DEFAULT_TOKEN_FIELD};
use crate::utils::LogLevel;

pub use env::{print_env_help, EnvConfig};
pub use file::find_config_file;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("log_capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown log level: {0}")]
    UnknownLogLevel(String),
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL; requests go to `{base_url}/{provider}/`
    pub base_url: String,

    /// Provider path segment
    pub provider: Provider,

    /// Body field carrying tokens in manual and batch runs
    pub token_field: String,

    /// Body field carrying the identity credential in exchanges
    pub credential_field: String,

    /// Delay between batch requests in milliseconds
    pub pacing_ms: u64,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Maximum number of result entries kept (unbounded when absent)
    pub log_capacity: Option<usize>,

    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            provider: Provider::default(),
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            credential_field: DEFAULT_TOKEN_FIELD.to_string(),
            pacing_ms: DEFAULT_PACING_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_capacity: None,
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = file::read(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        file::write(path.as_ref(), self)
    }

    /// Resolve configuration from file and environment
    ///
    /// An explicit path (flag or `OAUTH_HARNESS_CONFIG`) must exist; otherwise
    /// the standard locations are searched and defaults are used when none
    /// is found.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvConfig::load();
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_ref().map(Into::into))
            .or_else(find_config_file);

        let base = match path {
            Some(path) => Self::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => Self::default(),
        };

        let config = base.merge_env(&env)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn merge_env(mut self, env: &EnvConfig) -> Result<Self, ConfigError> {
        if let Some(base_url) = &env.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(provider) = &env.provider {
            self.provider = Provider::from_str(provider)
                .ok_or_else(|| ConfigError::UnknownProvider(provider.clone()))?;
        }
        if let Some(field) = &env.token_field {
            self.token_field = field.clone();
        }
        if let Some(field) = &env.credential_field {
            self.credential_field = field.clone();
        }
        if let Some(pacing_ms) = env.pacing_ms {
            self.pacing_ms = pacing_ms;
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(level) = &env.log_level {
            self.log_level = LogLevel::from_str(level)
                .ok_or_else(|| ConfigError::UnknownLogLevel(level.clone()))?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyField("base_url"));
        }
        if self.token_field.trim().is_empty() {
            return Err(ConfigError::EmptyField("token_field"));
        }
        if self.credential_field.trim().is_empty() {
            return Err(ConfigError::EmptyField("credential_field"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.log_capacity == Some(0) {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Endpoint for manual and batch runs
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(self.base_url.clone(), self.provider)
            .with_token_field(self.token_field.clone())
    }

    /// Endpoint for credential exchanges
    pub fn credential_endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(self.base_url.clone(), self.provider)
            .with_token_field(self.credential_field.clone())
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:9000/api/social");
        assert_eq!(config.provider, Provider::GoogleOauth2);
        assert_eq!(config.pacing_ms, 500);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("provider: github\npacing_ms: 50\n").unwrap();
        assert_eq!(config.provider, Provider::Github);
        assert_eq!(config.pacing(), Duration::from_millis(50));
        assert_eq!(config.token_field, "access_token");
    }

    #[test]
    fn test_save_load_yaml_and_json() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            base_url: "http://backend:8000/api/social".to_string(),
            provider: Provider::Facebook,
            log_capacity: Some(100),
            ..Default::default()
        };

        for name in ["config.yaml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(AppConfig::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "timeout_secs: 0\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_resolve_with_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(AppConfig::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_merge_env_overrides() {
        let env = EnvConfig {
            base_url: Some("http://staging/api/social".to_string()),
            provider: Some("twitter".to_string()),
            credential_field: Some("id_token".to_string()),
            pacing_ms: Some(0),
            ..Default::default()
        };

        let config = AppConfig::default().merge_env(&env).unwrap();
        assert_eq!(config.provider, Provider::Twitter);
        assert_eq!(config.pacing_ms, 0);
        assert_eq!(
            config.endpoint().endpoint(),
            "http://staging/api/social/twitter/"
        );
        assert_eq!(config.endpoint().token_field, "access_token");
        assert_eq!(config.credential_endpoint().token_field, "id_token");
    }

    #[test]
    fn test_merge_env_rejects_unknown_provider() {
        let env = EnvConfig {
            provider: Some("myspace".to_string()),
            ..Default::default()
        };
        assert_eq!(
            AppConfig::default().merge_env(&env),
            Err(ConfigError::UnknownProvider("myspace".to_string()))
        );
    }

    #[test]
    fn test_validate() {
        let config = AppConfig {
            token_field: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyField("token_field")));

        let config = AppConfig {
            log_capacity: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }
}
