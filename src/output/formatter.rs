//! Output formatters for test results
//!
//! Provides Table, JSON, CSV and summary output formats.

use serde::Serialize;

use crate::exchange::{AuthLogEntry, AuthState, LogKind, Session};
use crate::models::{BatchSummary, ResultEntry, Verdict};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

const CSV_HEADER: [&str; 12] = [
    "id",
    "time",
    "provider",
    "test",
    "token",
    "expected_success",
    "verdict",
    "status",
    "duration_ms",
    "endpoint",
    "error",
    "data",
];

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a single result entry
    pub fn format_entry(&self, entry: &ResultEntry) -> String {
        match self.format {
            OutputFormat::Table => self.format_entry_table(entry),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(entry),
            OutputFormat::Csv => csv_rows(std::slice::from_ref(entry)).unwrap_or_default(),
            OutputFormat::Summary => self.format_entry_summary(entry),
        }
    }

    /// Format a result log snapshot (newest first)
    pub fn format_entries(&self, entries: &[ResultEntry]) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(&entries),
            OutputFormat::Csv => csv_rows(entries).unwrap_or_default(),
            OutputFormat::Table | OutputFormat::Summary => {
                if entries.is_empty() {
                    return "No results yet.".to_string();
                }
                entries
                    .iter()
                    .map(|e| self.format_entry(e))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    fn verdict_str(&self, verdict: Verdict) -> String {
        let text = format!("{} {}", verdict.symbol(), verdict);
        if !self.colorize {
            return text;
        }
        let color = match verdict {
            Verdict::AsExpected | Verdict::Accepted => "32",
            Verdict::Rejected => "33",
            Verdict::Unexpected | Verdict::Error => "31",
        };
        format!("\x1b[{color}m{text}\x1b[0m")
    }

    fn format_entry_table(&self, entry: &ResultEntry) -> String {
        let mut output = format!(
            "[{}] {:16} {:14} status {:>3} [{:>5}ms] {}\n",
            entry.time(),
            entry.label(),
            entry.provider,
            entry.outcome.status,
            entry.outcome.duration_ms,
            self.verdict_str(entry.verdict()),
        );
        if let Some(description) = &entry.description {
            output.push_str(&format!("    {description}\n"));
        }
        output.push_str(&format!("    Endpoint: {}\n", entry.outcome.endpoint));
        output.push_str(&format!("    Token:    {}\n", entry.token));
        let data = serde_json::to_string_pretty(&entry.outcome.data).unwrap_or_default();
        for line in data.lines() {
            output.push_str(&format!("    {line}\n"));
        }
        output
    }

    fn format_entry_summary(&self, entry: &ResultEntry) -> String {
        format!(
            "{} {} ({} in {}ms)",
            entry.verdict().symbol(),
            entry.label(),
            entry.outcome.status,
            entry.outcome.duration_ms
        )
    }

    /// Format a batch summary
    pub fn format_summary(&self, summary: &BatchSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(summary),
            OutputFormat::Csv => csv_rows(&summary.entries).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &BatchSummary) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  Batch run - {:47} ║\n",
            summary.provider.label()
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for entry in &summary.entries {
            output.push_str(&format!(
                "║  {:16} {:>3} [{:>5}ms] {}\n",
                entry.label(),
                entry.outcome.status,
                entry.outcome.duration_ms,
                self.verdict_str(entry.verdict())
            ));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!("║  {}\n", self.format_summary_brief(summary)));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");
        output
    }

    fn format_summary_brief(&self, summary: &BatchSummary) -> String {
        let mut line = format!(
            "{}/{} as expected ({:.1}%), {} unexpected, {} transport errors, {}ms",
            summary.as_expected,
            summary.total,
            summary.pass_rate(),
            summary.unexpected,
            summary.transport_errors,
            summary.total_duration_ms
        );
        if summary.cancelled {
            line.push_str(" (cancelled)");
        }
        line
    }

    /// Format the exchange log (newest first)
    pub fn format_auth_logs(&self, logs: &[AuthLogEntry]) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(&logs),
            _ => {
                if logs.is_empty() {
                    return "No logs yet.".to_string();
                }
                logs.iter()
                    .map(|log| self.format_auth_log(log))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    fn format_auth_log(&self, log: &AuthLogEntry) -> String {
        let line = log.to_string();
        let line = if self.colorize {
            let color = match log.kind {
                LogKind::Info => "34",
                LogKind::Success => "32",
                LogKind::Error => "31",
            };
            format!("\x1b[{color}m{line}\x1b[0m")
        } else {
            line
        };

        match (&log.data, self.format) {
            (Some(data), OutputFormat::Table) => {
                format!("{line}\n    {}", serde_json::to_string(data).unwrap_or_default())
            }
            _ => line,
        }
    }

    /// Format the exchange outcome
    pub fn format_session(
        &self,
        state: AuthState,
        session: Option<&Session>,
        error: Option<&str>,
    ) -> String {
        if matches!(self.format, OutputFormat::Json | OutputFormat::JsonPretty) {
            #[derive(Serialize)]
            struct View<'a> {
                state: String,
                session: Option<&'a Session>,
                error: Option<&'a str>,
            }
            return self.to_json(&View {
                state: state.to_string(),
                session,
                error,
            });
        }

        let mut output = format!("State: {state}\n");
        if let Some(session) = session {
            output.push_str(&format!("  User:    {}\n", session.name().unwrap_or("User")));
            output.push_str(&format!(
                "  Email:   {}\n",
                session.email().unwrap_or("No email")
            ));
            output.push_str(&format!("  Access:  {}\n", session.tokens.access));
            output.push_str(&format!("  Refresh: {}\n", session.tokens.refresh));
        }
        if let Some(error) = error {
            output.push_str(&format!("  Error:   {error}\n"));
        }
        output
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

fn csv_rows(entries: &[ResultEntry]) -> csv::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for entry in entries {
        writer.write_record([
            entry.id.to_string(),
            entry.time(),
            entry.provider.to_string(),
            entry.label().to_string(),
            entry.token.clone(),
            entry
                .expected_success
                .map(|e| e.to_string())
                .unwrap_or_default(),
            format!("{:?}", entry.verdict()),
            entry.outcome.status.to_string(),
            entry.outcome.duration_ms.to_string(),
            entry.outcome.endpoint.clone(),
            entry.outcome.error.to_string(),
            entry.outcome.data.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
