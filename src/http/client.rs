//! HTTP client for OAuth endpoint testing
//!
//! Posts tokens to the backend and normalizes every result, including
//! transport failures, into a [`RequestOutcome`].

#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::{EndpointConfig, RequestOutcome};
use crate::utils::Timer;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
}

/// HTTP client posting tokens to the backend
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    timeout_secs: u64,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Post `token` to the configured endpoint
    pub async fn execute(&self, endpoint: &EndpointConfig, token: &str) -> RequestOutcome {
        self.post_token(&endpoint.endpoint(), &endpoint.token_field, token)
            .await
    }

    /// Post `{ field: token }` to `url`
    ///
    /// Never fails: a response that is not JSON, like any transport failure,
    /// comes back as an outcome with `error` set and `status == 0`.
    pub async fn post_token(&self, url: &str, field: &str, token: &str) -> RequestOutcome {
        let timer = Timer::start(format!("POST {url}"));

        match self.send_json(url, field, token).await {
            Ok((status, data)) => {
                let duration_ms = timer.stop_ms();
                debug!("Response: {} from {}", status, url);
                RequestOutcome::completed(status, data, duration_ms, url)
            }
            Err(e) => {
                let duration_ms = timer.stop_ms();
                error!("Request to {} failed: {}", url, e);
                RequestOutcome::transport_failure(e.to_string(), duration_ms, url)
            }
        }
    }

    async fn send_json(&self, url: &str, field: &str, token: &str) -> Result<(u16, Value), HttpError> {
        let mut body = Map::new();
        body.insert(field.to_string(), Value::String(token.to_string()));

        debug!("Sending POST request to {}", url);

        let response = self
            .client
            .post(url)
            .json(&Value::Object(body))
            .send()
            .await
            .map_err(|e| self.classify(e, url))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.classify(e, url))?;
        let data =
            serde_json::from_str(&text).map_err(|e| HttpError::InvalidJson(e.to_string()))?;

        Ok((status, data))
    }

    fn classify(&self, e: reqwest::Error, url: &str) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout(self.timeout_secs)
        } else if e.is_builder() {
            HttpError::InvalidUrl(url.to_string())
        } else if e.is_connect() {
            HttpError::ConnectionRefused(url.to_string())
        } else {
            HttpError::RequestFailed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutcomeKind, Provider};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoint_for(server: &MockServer) -> EndpointConfig {
        EndpointConfig::new(format!("{}/api/social", server.uri()), Provider::GoogleOauth2)
    }

    #[tokio::test]
    async fn posts_token_as_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/social/google-oauth2/"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "access_token": "abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let outcome = client.execute(&endpoint_for(&server), "abc").await;

        assert!(outcome.success);
        assert!(!outcome.error);
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.data["ok"], true);
        assert_eq!(
            outcome.endpoint,
            format!("{}/api/social/google-oauth2/", server.uri())
        );
    }

    #[tokio::test]
    async fn uses_configured_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "credential": "cred" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let endpoint = endpoint_for(&server).with_token_field("credential");
        let outcome = client.execute(&endpoint, "cred").await;

        assert_eq!(outcome.kind(), OutcomeKind::Accepted);
    }

    #[tokio::test]
    async fn passes_rejection_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "invalid_token" })),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let outcome = client.execute(&endpoint_for(&server), "invalid_token").await;

        assert!(!outcome.success);
        assert!(!outcome.error);
        assert_eq!(outcome.status, 401);
        assert_eq!(outcome.data["detail"], "invalid_token");
    }

    #[tokio::test]
    async fn non_json_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let outcome = client.execute(&endpoint_for(&server), "abc").await;

        assert_eq!(outcome.kind(), OutcomeKind::TransportError);
        assert_eq!(outcome.status, 0);
        assert!(outcome
            .error_message()
            .unwrap()
            .starts_with("Invalid JSON response"));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new().unwrap();
        let endpoint = EndpointConfig::new(format!("http://{addr}"), Provider::Github);
        let outcome = client.execute(&endpoint, "abc").await;

        assert!(outcome.error);
        assert!(!outcome.success);
        assert_eq!(outcome.status, 0);
        assert!(outcome.data["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_url_is_transport_error() {
        let client = HttpClient::new().unwrap();
        let endpoint = EndpointConfig::new("not a url", Provider::Github);
        let outcome = client.execute(&endpoint, "abc").await;

        assert_eq!(outcome.kind(), OutcomeKind::TransportError);
        assert_eq!(outcome.endpoint, "not a url/github/");
    }

    #[tokio::test]
    async fn timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::with_timeout(1).unwrap();
        let outcome = client.execute(&endpoint_for(&server), "abc").await;

        assert!(outcome.error);
        assert_eq!(outcome.error_message(), Some("Timeout after 1 seconds"));
        assert!(outcome.duration_ms >= 1000);
    }
}
