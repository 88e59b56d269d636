//! Result entry models
//!
//! Defines result entries, their verdicts and batch summaries.

#![allow(dead_code)]

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{OutcomeKind, Provider, RequestOutcome, TestCase};

/// Number of token characters kept in a manual preview
const PREVIEW_CHARS: usize = 20;

/// Shorten a token for display: first 20 characters followed by `...`
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Classification of a result entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Catalog case behaved as expected
    AsExpected,
    /// Catalog case did not behave as expected
    Unexpected,
    /// Manual request accepted by the backend
    Accepted,
    /// Manual request rejected by the backend
    Rejected,
    /// Manual request never completed
    Error,
}

impl Verdict {
    pub fn symbol(&self) -> &'static str {
        match self {
            Verdict::AsExpected | Verdict::Accepted => "✓",
            Verdict::Unexpected => "✗",
            Verdict::Rejected => "○",
            Verdict::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::AsExpected | Verdict::Accepted)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::AsExpected => write!(f, "Test passed as expected"),
            Verdict::Unexpected => write!(f, "Test failed unexpectedly"),
            Verdict::Accepted => write!(f, "ACCEPTED"),
            Verdict::Rejected => write!(f, "REJECTED"),
            Verdict::Error => write!(f, "ERROR"),
        }
    }
}

/// A classified outcome with its provenance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: u64,
    pub timestamp: DateTime<Local>,
    pub provider: Provider,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_success: Option<bool>,
    #[serde(flatten)]
    pub outcome: RequestOutcome,
}

impl ResultEntry {
    /// Entry for a manual request
    pub fn manual(provider: Provider, token: &str, outcome: RequestOutcome) -> Self {
        Self {
            id: rand::random(),
            timestamp: Local::now(),
            provider,
            token: token_preview(token),
            test_name: None,
            description: None,
            expected_success: None,
            outcome,
        }
    }

    /// Entry for a catalog case
    pub fn from_case(provider: Provider, case: &TestCase, outcome: RequestOutcome) -> Self {
        Self {
            id: rand::random(),
            timestamp: Local::now(),
            provider,
            token: case.display_token().to_string(),
            test_name: Some(case.name.to_string()),
            description: Some(case.description.to_string()),
            expected_success: Some(case.expect_success),
            outcome,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.expected_success.is_none()
    }

    pub fn verdict(&self) -> Verdict {
        match self.expected_success {
            Some(expected) if expected == self.outcome.success => Verdict::AsExpected,
            Some(_) => Verdict::Unexpected,
            None => match self.outcome.kind() {
                OutcomeKind::Accepted => Verdict::Accepted,
                OutcomeKind::Rejected => Verdict::Rejected,
                OutcomeKind::TransportError => Verdict::Error,
            },
        }
    }

    /// Label shown in listings
    pub fn label(&self) -> &str {
        self.test_name.as_deref().unwrap_or("Manual Test")
    }

    /// Time of day as shown in listings
    pub fn time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for ResultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} {} -> {} [{}ms]",
            self.verdict().symbol(),
            self.time(),
            self.label(),
            self.provider,
            self.outcome.status,
            self.outcome.duration_ms
        )
    }
}

/// Summary of one batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    pub provider: Provider,
    pub total: usize,
    pub as_expected: usize,
    pub unexpected: usize,
    pub transport_errors: usize,
    pub total_duration_ms: u64,
    pub cancelled: bool,
    /// Entries in execution order
    pub entries: Vec<ResultEntry>,
}

impl BatchSummary {
    pub fn new(provider: Provider, entries: Vec<ResultEntry>, cancelled: bool) -> Self {
        let total = entries.len();
        let as_expected = entries
            .iter()
            .filter(|e| e.verdict() == Verdict::AsExpected)
            .count();
        let transport_errors = entries.iter().filter(|e| e.outcome.error).count();
        let total_duration_ms = entries.iter().map(|e| e.outcome.duration_ms).sum();

        Self {
            provider,
            total,
            as_expected,
            unexpected: total - as_expected,
            transport_errors,
            total_duration_ms,
            cancelled,
            entries,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.as_expected as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_expected(&self) -> bool {
        self.as_expected == self.total
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch run - {}", self.provider.label())?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | As expected: {} | Unexpected: {} | Transport errors: {}",
            self.total, self.as_expected, self.unexpected, self.transport_errors
        )?;
        write!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )?;
        if self.cancelled {
            write!(f, " | cancelled")?;
        }
        Ok(())
    }
}
