//! Test execution engine
//!
//! Provides the sequencer driving manual and batch runs.

mod sequencer;

pub use sequencer::{Sequencer, DEFAULT_PACING_MS};
