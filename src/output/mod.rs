//! Output formatting module
//!
//! Report file formats and console summaries.

mod formatter;

pub use formatter::{write_report, OutputFormat, ResultFormatter};
