//! HTTP client module for OAuth endpoint testing
//!
//! Provides the request executor used by the sequencer and the exchange flow.

mod client;

pub use client::{HttpClient, DEFAULT_TIMEOUT_SECS};
