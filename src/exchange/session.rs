//! Session and exchange log models

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Backend-issued token pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// An authenticated session
///
/// User and tokens only ever exist together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Value,
    pub tokens: TokenPair,
}

impl Session {
    /// Build a session from a backend success body
    ///
    /// Returns `None` unless both `access` and `refresh` are non-empty
    /// strings. A missing or null `user` becomes an empty object.
    pub fn from_response(data: &Value) -> Option<Self> {
        let field = |name: &str| {
            data.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let tokens = TokenPair {
            access: field("access")?,
            refresh: field("refresh")?,
        };
        let user = match data.get("user") {
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(user) => user.clone(),
        };

        Some(Self { user, tokens })
    }

    pub fn email(&self) -> Option<&str> {
        self.user.get("email").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.user.get("name").and_then(Value::as_str)
    }
}

/// Severity of an exchange log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Error,
}

impl LogKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogKind::Info => "i",
            LogKind::Success => "✓",
            LogKind::Error => "✗",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Info => write!(f, "INFO"),
            LogKind::Success => write!(f, "SUCCESS"),
            LogKind::Error => write!(f, "ERROR"),
        }
    }
}

/// One event recorded by the exchange flow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthLogEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub timestamp: DateTime<Local>,
}

impl AuthLogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            id: rand::random(),
            kind,
            message: message.into(),
            data,
            timestamp: Local::now(),
        }
    }
}

impl fmt::Display for AuthLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.kind.symbol(),
            self.timestamp.format("%H:%M:%S"),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_from_full_response() {
        let data = json!({ "access": "a", "refresh": "b", "user": { "email": "x@y.com" } });
        let session = Session::from_response(&data).unwrap();
        assert_eq!(session.tokens.access, "a");
        assert_eq!(session.tokens.refresh, "b");
        assert_eq!(session.email(), Some("x@y.com"));
    }

    #[test]
    fn test_session_defaults_user() {
        let session = Session::from_response(&json!({ "access": "a", "refresh": "b" })).unwrap();
        assert_eq!(session.user, json!({}));

        let session =
            Session::from_response(&json!({ "access": "a", "refresh": "b", "user": null }))
                .unwrap();
        assert_eq!(session.user, json!({}));
    }

    #[test]
    fn test_session_requires_both_tokens() {
        assert!(Session::from_response(&json!({ "access": "a" })).is_none());
        assert!(Session::from_response(&json!({ "refresh": "b" })).is_none());
        assert!(Session::from_response(&json!({ "access": "", "refresh": "b" })).is_none());
        assert!(Session::from_response(&json!({ "access": 1, "refresh": "b" })).is_none());
        assert!(Session::from_response(&json!([])).is_none());
    }

    #[test]
    fn test_log_entry_serializes_type() {
        let entry = AuthLogEntry::new(LogKind::Error, "Network error", None);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "error");
        assert!(value.get("data").is_none());
    }
}
