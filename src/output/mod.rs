//! Rendering of result entries, batch summaries and exchange logs

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
