//! Failure records
//!
//! One record per failed assertion or captured error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Source position of a failed assertion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the caller of a `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A recorded failure
///
/// `location` is `None` when the failure did not come from an assertion
/// (an error escaping the test body). `error` holds the captured error,
/// if any; `detail` carries an assertion's own description such as the
/// compared values.
#[derive(Debug)]
pub struct FailureRecord {
    pub location: Option<SourceLocation>,
    pub detail: Option<String>,
    pub error: Option<anyhow::Error>,
}

impl FailureRecord {
    pub fn assertion(location: SourceLocation) -> Self {
        Self {
            location: Some(location),
            detail: None,
            error: None,
        }
    }

    pub fn captured(location: Option<SourceLocation>, error: anyhow::Error) -> Self {
        Self {
            location,
            detail: None,
            error: Some(error),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Rendered message of the captured error, including its context chain
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("{e:#}"))
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}")?,
            None => write!(f, "<no location>")?,
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        if let Some(message) = self.error_message() {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}
