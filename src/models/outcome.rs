//! Request outcome model
//!
//! The normalized result of one request against the backend.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Category of a request outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Completed with a 2xx status
    Accepted,
    /// Completed with any other status
    Rejected,
    /// Request could not be completed
    TransportError,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Accepted => write!(f, "ACCEPTED"),
            OutcomeKind::Rejected => write!(f, "REJECTED"),
            OutcomeKind::TransportError => write!(f, "ERROR"),
        }
    }
}

/// Result of one HTTP exchange
///
/// Only built through [`RequestOutcome::completed`] and
/// [`RequestOutcome::transport_failure`], so `error` implies
/// `!success && status == 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub success: bool,
    pub status: u16,
    pub data: Value,
    pub duration_ms: u64,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl RequestOutcome {
    /// A completed HTTP exchange with a decoded JSON body
    pub fn completed(
        status: u16,
        data: Value,
        duration_ms: u64,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            success: (200..300).contains(&status),
            status,
            data,
            duration_ms,
            endpoint: endpoint.into(),
            error: false,
        }
    }

    /// A request that never produced a usable response
    pub fn transport_failure(
        message: impl Into<String>,
        duration_ms: u64,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            status: 0,
            data: json!({ "error": message.into() }),
            duration_ms,
            endpoint: endpoint.into(),
            error: true,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        if self.error {
            OutcomeKind::TransportError
        } else if self.success {
            OutcomeKind::Accepted
        } else {
            OutcomeKind::Rejected
        }
    }

    /// Transport diagnostic, if any
    pub fn error_message(&self) -> Option<&str> {
        if !self.error {
            return None;
        }
        self.data.get("error").and_then(Value::as_str)
    }
}
