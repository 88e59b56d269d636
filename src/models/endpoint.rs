//! Endpoint configuration models
//!
//! Defines the OAuth providers and the backend endpoint they are posted to.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default backend base URL (local development server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:9000/api/social";

/// Default JSON field carrying the token in the request body
pub const DEFAULT_TOKEN_FIELD: &str = "access_token";

/// Social login providers known to the backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "google-oauth2")]
    GoogleOauth2,
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "github")]
    Github,
}

impl Provider {
    /// Path segment used by the backend
    pub fn slug(&self) -> &'static str {
        match self {
            Provider::GoogleOauth2 => "google-oauth2",
            Provider::Facebook => "facebook",
            Provider::Twitter => "twitter",
            Provider::Github => "github",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Provider::GoogleOauth2 => "Google OAuth2",
            Provider::Facebook => "Facebook",
            Provider::Twitter => "Twitter",
            Provider::Github => "GitHub",
        }
    }

    /// Get all providers
    pub fn all() -> Vec<Provider> {
        vec![
            Provider::GoogleOauth2,
            Provider::Facebook,
            Provider::Twitter,
            Provider::Github,
        ]
    }

    /// Parse from slug (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google-oauth2" | "google" => Some(Provider::GoogleOauth2),
            "facebook" => Some(Provider::Facebook),
            "twitter" => Some(Provider::Twitter),
            "github" => Some(Provider::Github),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Backend endpoint configuration
///
/// The target URL is derived by plain concatenation; the provider is a path
/// segment and nothing is escaped. Malformed URLs only show up as transport
/// errors when a request is attempted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub provider: Provider,
    pub token_field: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            provider: Provider::default(),
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, provider: Provider) -> Self {
        Self {
            base_url: base_url.into(),
            provider,
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
        }
    }

    pub fn with_token_field(mut self, field: impl Into<String>) -> Self {
        self.token_field = field.into();
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// `{base_url}/{provider}/`
    pub fn endpoint(&self) -> String {
        format!("{}/{}/", self.base_url, self.provider.slug())
    }
}
