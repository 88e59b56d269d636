//! Credential exchange flow
//!
//! Trades an identity-provider credential for backend session tokens.
//!
//! ```text
//! Anonymous --credential--> Authenticating --tokens--> Authenticated
//!     ^                           |                          |
//!     +---------failure-----------+-----------logout---------+
//! ```

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fmt;
use tracing::{info, warn};

use crate::http::HttpClient;
use crate::models::{token_preview, EndpointConfig, OutcomeKind};
use crate::results::EntryLog;

use super::session::{AuthLogEntry, LogKind, Session, TokenPair};

const NO_CREDENTIAL: &str = "No credential returned from identity provider";
const WIDGET_FAILED: &str = "Identity provider login failed";
const INCOMPLETE_RESPONSE: &str = "Backend returned incomplete data";

/// Inbound event from the identity provider widget
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Login completed; the credential may still be missing
    Credential(Option<String>),
    /// Login failed, with an optional reason
    Failed(Option<String>),
}

/// Exchange state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Anonymous => write!(f, "anonymous"),
            AuthState::Authenticating => write!(f, "authenticating"),
            AuthState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// State machine around the credential exchange
pub struct ExchangeFlow {
    client: HttpClient,
    endpoint: EndpointConfig,
    state: AuthState,
    session: Option<Session>,
    error: Option<String>,
    logs: EntryLog<AuthLogEntry>,
}

impl ExchangeFlow {
    /// `endpoint.token_field` names the field carrying the credential
    pub fn new(client: HttpClient, endpoint: EndpointConfig) -> Self {
        Self {
            client,
            endpoint,
            state: AuthState::Anonymous,
            session: None,
            error: None,
            logs: EntryLog::new(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&Value> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.session.as_ref().map(|s| &s.tokens)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Exchange log, newest first
    pub fn logs(&self) -> Vec<AuthLogEntry> {
        self.logs.snapshot()
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// React to the identity widget
    pub async fn handle_widget_event(&mut self, event: WidgetEvent) -> AuthState {
        match event {
            WidgetEvent::Credential(Some(credential)) if !credential.is_empty() => {
                self.log(
                    LogKind::Success,
                    "Received credential",
                    Some(json!({ "preview": token_preview(&credential) })),
                );
                self.exchange(&credential).await
            }
            WidgetEvent::Credential(_) => {
                warn!("Identity widget returned no credential");
                self.error = Some(NO_CREDENTIAL.to_string());
                self.log(LogKind::Error, "No credential in response", None);
                self.state
            }
            WidgetEvent::Failed(reason) => {
                warn!("Identity widget login failed: {:?}", reason);
                self.error = Some(WIDGET_FAILED.to_string());
                let data = reason.map(|r| json!({ "reason": r }));
                self.log(LogKind::Error, WIDGET_FAILED, data);
                self.state
            }
        }
    }

    /// Post `credential` to the backend and update the session
    pub async fn exchange(&mut self, credential: &str) -> AuthState {
        let endpoint = self.endpoint.endpoint();
        self.log(
            LogKind::Info,
            "Sending credential to backend",
            Some(json!({ "endpoint": endpoint })),
        );
        self.state = AuthState::Authenticating;

        let outcome = self.client.execute(&self.endpoint, credential).await;

        match outcome.kind() {
            OutcomeKind::Accepted => match Session::from_response(&outcome.data) {
                Some(session) => {
                    info!(
                        "Authenticated as {}",
                        session.email().unwrap_or("unknown user")
                    );
                    self.session = Some(session);
                    self.error = None;
                    self.state = AuthState::Authenticated;
                    self.log(
                        LogKind::Success,
                        "Authentication successful!",
                        Some(outcome.data),
                    );
                }
                None => {
                    warn!("Backend accepted credential without issuing tokens");
                    self.fail(INCOMPLETE_RESPONSE.to_string());
                    self.log(
                        LogKind::Error,
                        "Invalid response format from backend",
                        Some(outcome.data),
                    );
                }
            },
            OutcomeKind::Rejected => {
                warn!("Backend rejected credential with status {}", outcome.status);
                self.fail(outcome.data.to_string());
                self.log(LogKind::Error, "Backend rejected token", Some(outcome.data));
            }
            OutcomeKind::TransportError => {
                let message = outcome.error_message().unwrap_or("Network error").to_string();
                self.fail(message.clone());
                self.log(
                    LogKind::Error,
                    "Network error",
                    Some(json!({ "error": message })),
                );
            }
        }

        self.state
    }

    /// Drop the session; safe from any state
    pub fn logout(&mut self) {
        self.session = None;
        self.error = None;
        self.state = AuthState::Anonymous;
        info!("Logged out");
        self.log(LogKind::Info, "Logged out", None);
    }

    fn fail(&mut self, error: String) {
        self.session = None;
        self.error = Some(error);
        self.state = AuthState::Anonymous;
    }

    fn log(&mut self, kind: LogKind, message: &str, data: Option<Value>) {
        self.logs.append(AuthLogEntry::new(kind, message, data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn flow_for(server: &MockServer) -> ExchangeFlow {
        let endpoint = EndpointConfig::new(server.uri(), Provider::GoogleOauth2);
        ExchangeFlow::new(HttpClient::new().unwrap(), endpoint)
    }

    async fn respond(server: &MockServer, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/google-oauth2/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    fn assert_consistent(flow: &ExchangeFlow) {
        assert_eq!(flow.user().is_some(), flow.tokens().is_some());
        assert_eq!(
            flow.session().is_some(),
            flow.state() == AuthState::Authenticated
        );
    }

    #[tokio::test]
    async fn successful_exchange_authenticates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "access_token": "cred1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "a",
                "refresh": "b",
                "user": { "email": "x@y.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut flow = flow_for(&server);
        let state = flow
            .handle_widget_event(WidgetEvent::Credential(Some("cred1".to_string())))
            .await;

        assert_eq!(state, AuthState::Authenticated);
        assert_eq!(flow.user().unwrap()["email"], "x@y.com");
        assert_eq!(flow.tokens().unwrap().access, "a");
        assert_eq!(flow.tokens().unwrap().refresh, "b");
        assert!(flow.last_error().is_none());
        assert_consistent(&flow);

        let messages: Vec<_> = flow.logs().into_iter().map(|l| l.message).collect();
        assert_eq!(
            messages,
            [
                "Authentication successful!",
                "Sending credential to backend",
                "Received credential"
            ]
        );
    }

    #[tokio::test]
    async fn success_clears_previous_error() {
        let server = MockServer::start().await;
        respond(&server, 200, json!({ "access": "a", "refresh": "b" })).await;

        let mut flow = flow_for(&server);
        flow.handle_widget_event(WidgetEvent::Failed(None)).await;
        assert!(flow.last_error().is_some());

        flow.exchange("cred").await;
        assert!(flow.last_error().is_none());
        assert_eq!(flow.user(), Some(&json!({})));
    }

    #[tokio::test]
    async fn incomplete_success_is_rejected() {
        let server = MockServer::start().await;
        respond(&server, 200, json!({ "access": "a" })).await;

        let mut flow = flow_for(&server);
        let state = flow.exchange("cred").await;

        assert_eq!(state, AuthState::Anonymous);
        assert_eq!(flow.last_error(), Some("Backend returned incomplete data"));
        assert!(flow.session().is_none());
        assert_consistent(&flow);

        let latest = &flow.logs()[0];
        assert_eq!(latest.kind, LogKind::Error);
        assert_eq!(latest.message, "Invalid response format from backend");
        assert_eq!(latest.data, Some(json!({ "access": "a" })));
    }

    #[tokio::test]
    async fn backend_rejection_records_body() {
        let server = MockServer::start().await;
        respond(&server, 400, json!({ "errors": { "token": "Invalid token" } })).await;

        let mut flow = flow_for(&server);
        let state = flow.exchange("bad").await;

        assert_eq!(state, AuthState::Anonymous);
        assert_eq!(
            flow.last_error(),
            Some(r#"{"errors":{"token":"Invalid token"}}"#)
        );
        assert_eq!(flow.logs()[0].message, "Backend rejected token");
        assert_consistent(&flow);
    }

    #[tokio::test]
    async fn network_error_is_logged() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = EndpointConfig::new(format!("http://{addr}"), Provider::GoogleOauth2);
        let mut flow = ExchangeFlow::new(HttpClient::new().unwrap(), endpoint);
        let state = flow.exchange("cred").await;

        assert_eq!(state, AuthState::Anonymous);
        let latest = &flow.logs()[0];
        assert_eq!(latest.message, "Network error");
        let message = latest.data.as_ref().unwrap()["error"].as_str().unwrap();
        assert_eq!(flow.last_error(), Some(message));
        assert_consistent(&flow);
    }

    #[tokio::test]
    async fn failed_exchange_drops_existing_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "access_token": "good" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access": "a", "refresh": "b" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "access_token": "bad" })))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "no" })))
            .mount(&server)
            .await;

        let mut flow = flow_for(&server);
        assert_eq!(flow.exchange("good").await, AuthState::Authenticated);
        assert_eq!(flow.exchange("bad").await, AuthState::Anonymous);
        assert!(flow.session().is_none());
        assert_consistent(&flow);
    }

    #[tokio::test]
    async fn missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut flow = flow_for(&server);
        let state = flow.handle_widget_event(WidgetEvent::Credential(None)).await;
        assert_eq!(state, AuthState::Anonymous);
        let state = flow
            .handle_widget_event(WidgetEvent::Credential(Some(String::new())))
            .await;
        assert_eq!(state, AuthState::Anonymous);

        assert_eq!(
            flow.last_error(),
            Some("No credential returned from identity provider")
        );
        assert_eq!(flow.logs().len(), 2);
        assert!(flow.logs().iter().all(|l| l.kind == LogKind::Error));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn widget_failure_keeps_session() {
        let server = MockServer::start().await;
        respond(&server, 200, json!({ "access": "a", "refresh": "b" })).await;

        let mut flow = flow_for(&server);
        flow.exchange("cred").await;
        let state = flow
            .handle_widget_event(WidgetEvent::Failed(Some("popup_closed".to_string())))
            .await;

        assert_eq!(state, AuthState::Authenticated);
        assert!(flow.session().is_some());
        assert_eq!(flow.last_error(), Some("Identity provider login failed"));
        assert_eq!(
            flow.logs()[0].data,
            Some(json!({ "reason": "popup_closed" }))
        );
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let server = MockServer::start().await;
        respond(&server, 200, json!({ "access": "a", "refresh": "b" })).await;

        let mut flow = flow_for(&server);
        flow.exchange("cred").await;

        flow.logout();
        assert!(flow.session().is_none());
        assert!(flow.last_error().is_none());
        assert_eq!(flow.state(), AuthState::Anonymous);

        flow.logout();
        assert!(flow.session().is_none());
        assert!(flow.last_error().is_none());
        assert_consistent(&flow);

        let logs = flow.logs();
        assert_eq!(logs[0].kind, LogKind::Info);
        assert_eq!(logs[1].message, "Logged out");

        flow.clear_logs();
        assert!(flow.logs().is_empty());
    }
}
