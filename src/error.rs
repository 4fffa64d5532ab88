//! Error types for the test engine
//!
//! Errors raised by units, collections, the registry and the worker pool.
//! Failures inside a test body are never reported through this type; they
//! are recorded on the unit and surface only through its report.

use thiserror::Error;

use crate::models::TestState;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Test '{unit}' has not been run yet (state: {state})")]
    InvalidState { unit: String, state: TestState },

    #[error("Test '{0}' has already been invoked")]
    AlreadyInvoked(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: TestState, to: TestState },

    #[error("Test collection not found: {0}")]
    NotFound(String),

    #[error("Test collection already exists: {0}")]
    DuplicateName(String),

    #[error("No Tokio runtime available to run test jobs")]
    NoRuntime,

    #[error("Test job did not complete: {0}")]
    JobFailed(String),
}

/// Engine result alias
pub type Result<T> = std::result::Result<T, Error>;
