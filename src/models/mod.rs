//! Data models for test execution
//!
//! States, failure records and the serializable outcome snapshots.

mod failure;
mod state;
mod summary;

pub use failure::{FailureRecord, SourceLocation};
pub use state::TestState;
pub use summary::{CollectionSummary, FailureSummary, UnitSummary};
