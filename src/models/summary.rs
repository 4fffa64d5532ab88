//! Serializable outcome snapshots
//!
//! Plain-data views of settled units and collections, for the JSON and CSV
//! output formats and for callers that want structured results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FailureRecord, SourceLocation, TestState};

/// Snapshot of one failure record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub location: Option<SourceLocation>,
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl From<&FailureRecord> for FailureSummary {
    fn from(record: &FailureRecord) -> Self {
        Self {
            location: record.location.clone(),
            detail: record.detail.clone(),
            error: record.error_message(),
        }
    }
}

/// Snapshot of a single test unit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitSummary {
    pub name: String,
    pub state: TestState,
    pub duration_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub failures: Vec<FailureSummary>,
}

impl UnitSummary {
    pub fn passed(&self) -> bool {
        self.state == TestState::Passed
    }
}

impl fmt::Display for UnitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.state.symbol(),
            self.name,
            self.duration_ms
        )?;
        if !self.failures.is_empty() {
            write!(f, " - {} failure(s)", self.failures.len())?;
        }
        Ok(())
    }
}

/// Snapshot of a test collection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub collection: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub units: Vec<UnitSummary>,
}

impl CollectionSummary {
    pub fn new(collection: impl Into<String>, units: Vec<UnitSummary>) -> Self {
        let total = units.len();
        let passed = units.iter().filter(|u| u.passed()).count();
        let total_duration_ms = units.iter().map(|u| u.duration_ms).sum();

        Self {
            collection: collection.into(),
            total,
            passed,
            failed: total - passed,
            total_duration_ms,
            units,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for CollectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Collection {}", self.collection)?;
        for unit in &self.units {
            writeln!(f, "  {unit}")?;
        }
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Pass Rate: {:.1}% | Duration: {}ms",
            self.total,
            self.passed,
            self.failed,
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, state: TestState, duration_ms: u64) -> UnitSummary {
        UnitSummary {
            name: name.to_string(),
            state,
            duration_ms,
            started_at: None,
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_collection_summary_counts() {
        let summary = CollectionSummary::new(
            "Math",
            vec![
                unit("Adds", TestState::Passed, 3),
                unit("Divides", TestState::Failed, 5),
                unit("Parses", TestState::FailedWithException, 2),
            ],
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total_duration_ms, 10);
        assert!(!summary.is_all_passed());
    }

    #[test]
    fn test_empty_collection_pass_rate() {
        let summary = CollectionSummary::new("Empty", Vec::new());
        assert_eq!(summary.pass_rate(), 0.0);
        assert!(summary.is_all_passed());
    }
}
