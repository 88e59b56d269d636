//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

#![allow(dead_code)]

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "OAUTH_HARNESS";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Base URL from OAUTH_HARNESS_BASE_URL
    pub base_url: Option<String>,
    /// Provider from OAUTH_HARNESS_PROVIDER
    pub provider: Option<String>,
    /// Token field from OAUTH_HARNESS_TOKEN_FIELD
    pub token_field: Option<String>,
    /// Credential field from OAUTH_HARNESS_CREDENTIAL_FIELD
    pub credential_field: Option<String>,
    /// Pacing from OAUTH_HARNESS_PACING_MS
    pub pacing_ms: Option<u64>,
    /// Timeout from OAUTH_HARNESS_TIMEOUT
    pub timeout: Option<u64>,
    /// Log level from OAUTH_HARNESS_LOG_LEVEL
    pub log_level: Option<String>,
    /// Config file from OAUTH_HARNESS_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: get_env("BASE_URL"),
            provider: get_env("PROVIDER"),
            token_field: get_env("TOKEN_FIELD"),
            credential_field: get_env("CREDENTIAL_FIELD"),
            pacing_ms: get_env_parse("PACING_MS"),
            timeout: get_env_parse("TIMEOUT"),
            log_level: get_env("LOG_LEVEL"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.provider.is_some()
            || self.token_field.is_some()
            || self.credential_field.is_some()
            || self.pacing_ms.is_some()
            || self.timeout.is_some()
            || self.log_level.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_BASE_URL:         {:?}", ENV_PREFIX, self.base_url);
        println!("  {}_PROVIDER:         {:?}", ENV_PREFIX, self.provider);
        println!("  {}_TOKEN_FIELD:      {:?}", ENV_PREFIX, self.token_field);
        println!("  {}_CREDENTIAL_FIELD: {:?}", ENV_PREFIX, self.credential_field);
        println!("  {}_PACING_MS:        {:?}", ENV_PREFIX, self.pacing_ms);
        println!("  {}_TIMEOUT:          {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_LOG_LEVEL:        {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_CONFIG:           {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Print all OAUTH_HARNESS environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_BASE_URL          Backend base URL");
    println!("  {ENV_PREFIX}_PROVIDER          Provider (google-oauth2, facebook, twitter, github)");
    println!("  {ENV_PREFIX}_TOKEN_FIELD       Body field for tokens (default access_token)");
    println!("  {ENV_PREFIX}_CREDENTIAL_FIELD  Body field for exchange credentials");
    println!("  {ENV_PREFIX}_PACING_MS         Delay between batch requests");
    println!("  {ENV_PREFIX}_TIMEOUT           Request timeout in seconds");
    println!("  {ENV_PREFIX}_LOG_LEVEL         Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_BASE_URL=http://localhost:9000/api/social");
    println!("  export {ENV_PREFIX}_PROVIDER=github");
    println!("  oauth-harness run");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Restores environment variables on drop
    struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let previous = vars
                .iter()
                .map(|(k, _)| {
                    let key = format!("{ENV_PREFIX}_{k}");
                    let old = env::var(&key).ok();
                    (key, old)
                })
                .collect();
            for (k, v) in vars {
                env::set_var(format!("{ENV_PREFIX}_{k}"), v);
            }
            Self { previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.base_url.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_load() {
        let _guard = EnvGuard::set(&[
            ("BASE_URL", "http://10.0.0.1/api/social"),
            ("PACING_MS", "250"),
        ]);

        let config = EnvConfig::load();
        assert_eq!(
            config.base_url,
            Some("http://10.0.0.1/api/social".to_string())
        );
        assert_eq!(config.pacing_ms, Some(250));
        assert!(config.has_any());
    }

    #[test]
    fn test_env_unparseable_number_ignored() {
        let _guard = EnvGuard::set(&[("TIMEOUT", "soon")]);
        assert_eq!(EnvConfig::load().timeout, None);
    }
}
