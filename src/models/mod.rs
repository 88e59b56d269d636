//! Data models for OAuth endpoint testing
//!
//! This module contains all data structures used throughout the application.

mod endpoint;
mod outcome;
pub mod test_case;
mod test_result;

pub use endpoint::{EndpointConfig, Provider, DEFAULT_BASE_URL, DEFAULT_TOKEN_FIELD};
pub use outcome::{OutcomeKind, RequestOutcome};
pub use test_case::TestCase;
pub use test_result::{token_preview, BatchSummary, ResultEntry, Verdict};
