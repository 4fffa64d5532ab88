//! Test unit state machine
//!
//! A unit moves `NotRun -> InProgress -> {Passed, Failed, FailedWithException}`
//! and never leaves a terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Execution state of a single test unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
    #[default]
    NotRun,
    InProgress,
    Passed,
    Failed,
    FailedWithException,
}

impl TestState {
    /// Whether the state is terminal (the result can be read)
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            TestState::Passed | TestState::Failed | TestState::FailedWithException
        )
    }

    /// Whether the state is one of the failed terminal states
    pub fn is_failure(&self) -> bool {
        matches!(self, TestState::Failed | TestState::FailedWithException)
    }

    /// Validate and perform a move to `next`
    pub fn transition(self, next: TestState) -> Result<TestState> {
        let allowed = match (self, next) {
            (TestState::NotRun, TestState::InProgress) => true,
            (TestState::InProgress, to) => to.is_ready(),
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(Error::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TestState::NotRun => "○",
            TestState::InProgress => "…",
            TestState::Passed => "✓",
            TestState::Failed => "✗",
            TestState::FailedWithException => "!",
        }
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestState::NotRun => write!(f, "NOT_RUN"),
            TestState::InProgress => write!(f, "IN_PROGRESS"),
            TestState::Passed => write!(f, "PASSED"),
            TestState::Failed => write!(f, "FAILED"),
            TestState::FailedWithException => write!(f, "FAILED_WITH_EXCEPTION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        let state = TestState::NotRun.transition(TestState::InProgress).unwrap();
        assert_eq!(state, TestState::InProgress);

        for terminal in [
            TestState::Passed,
            TestState::Failed,
            TestState::FailedWithException,
        ] {
            assert_eq!(TestState::InProgress.transition(terminal), Ok(terminal));
        }
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(TestState::NotRun.transition(TestState::Passed).is_err());
        assert!(TestState::InProgress.transition(TestState::NotRun).is_err());
        assert!(TestState::Passed.transition(TestState::Failed).is_err());
        assert!(TestState::Failed.transition(TestState::InProgress).is_err());
        assert!(TestState::FailedWithException
            .transition(TestState::Passed)
            .is_err());
    }

    #[test]
    fn test_readiness() {
        assert!(!TestState::NotRun.is_ready());
        assert!(!TestState::InProgress.is_ready());
        assert!(TestState::Passed.is_ready());
        assert!(!TestState::Passed.is_failure());
        assert!(TestState::FailedWithException.is_failure());
    }
}
