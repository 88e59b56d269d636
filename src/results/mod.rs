//! In-memory result logs
//!
//! Append-only, newest-first logs for result entries and exchange events.

mod log;

pub use log::{EntryLog, ResultLog};
