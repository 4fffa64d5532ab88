//! Test units
//!
//! A [`TestUnit`] pairs a named [`TestCase`] with its execution record and
//! drives the state machine exactly once through [`TestUnit::invoke`].
//!
//! ## Example
//!
//! ```
//! use unitpool::{TestState, TestUnit};
//!
//! let mut unit = TestUnit::from_fn("AddsCorrectly", |t| {
//!     t.assert_eq(2 + 2, 4)?;
//!     Ok(())
//! });
//! unit.invoke().unwrap();
//! assert_eq!(unit.state(), TestState::Passed);
//! ```

mod case;
mod context;

pub use case::{FnCase, TestCase};
pub use context::{Abort, FatalSignal, Outcome, TestContext};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{FailureRecord, FailureSummary, TestState, UnitSummary};
use context::panic_message;

/// A named test together with its state machine
pub struct TestUnit {
    name: String,
    case: Box<dyn TestCase>,
    state: TestState,
    started: Option<Instant>,
    finished: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    failures: Vec<FailureRecord>,
}

impl TestUnit {
    pub fn new(name: impl Into<String>, case: impl TestCase) -> Self {
        Self {
            name: name.into(),
            case: Box::new(case),
            state: TestState::NotRun,
            started: None,
            finished: None,
            started_at: None,
            failures: Vec::new(),
        }
    }

    /// Build a unit from a closure body
    pub fn from_fn<F>(name: impl Into<String>, body: F) -> Self
    where
        F: FnMut(&mut TestContext) -> Outcome + Send + 'static,
    {
        Self::new(name, FnCase::new(body))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TestState {
        self.state
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Whether the unit passed; fails until the unit is ready
    pub fn passed(&self) -> Result<bool> {
        self.ensure_ready()?;
        Ok(self.state == TestState::Passed)
    }

    /// Time spent in the body; fails until the unit is ready
    pub fn duration(&self) -> Result<Duration> {
        self.ensure_ready()?;
        match (self.started, self.finished) {
            (Some(start), Some(end)) => Ok(end.duration_since(start)),
            _ => Err(self.not_ready()),
        }
    }

    /// Wall-clock start of the body
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Run setup, body and teardown, settling the unit's result
    ///
    /// Fatal assertions end the body early; errors and panics escaping the
    /// body are captured. Nothing from the body propagates to the caller.
    /// A unit can only be invoked once.
    pub fn invoke(&mut self) -> Result<TestState> {
        if self.state != TestState::NotRun {
            warn!("Refusing to re-run test {} ({})", self.name, self.state);
            return Err(Error::AlreadyInvoked(self.name.clone()));
        }

        debug!("Starting test {}", self.name);
        let setup = panic::catch_unwind(AssertUnwindSafe(|| self.case.setup()));

        self.state = self.state.transition(TestState::InProgress)?;
        self.started = Some(Instant::now());
        self.started_at = Some(Utc::now());

        let mut context = TestContext::new();
        let escaped = match setup {
            Err(payload) => Some(anyhow!(
                "setup panicked: {}",
                panic_message(payload.as_ref())
            )),
            Ok(()) => {
                let case = &mut self.case;
                match panic::catch_unwind(AssertUnwindSafe(|| case.run(&mut context))) {
                    Ok(Ok(())) => None,
                    Ok(Err(Abort::Fatal(signal))) => {
                        debug!("Test {} stopped by assertion at {}", self.name, signal);
                        // Raised by some other context; the stop itself is the failure
                        if !context.has_failures() {
                            context.record(FailureRecord::assertion(signal.into_location()));
                        }
                        None
                    }
                    Ok(Err(Abort::Error(error))) => Some(error),
                    Err(payload) => Some(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
                }
            }
        };

        let mut failures = context.into_failures();
        let outcome = match escaped {
            Some(error) => {
                failures.push(FailureRecord::captured(None, error));
                TestState::FailedWithException
            }
            None if failures.is_empty() => TestState::Passed,
            None => TestState::Failed,
        };

        self.finished = Some(Instant::now());
        self.failures = failures;
        self.state = self.state.transition(outcome)?;

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.case.teardown())) {
            warn!(
                "Teardown of test {} panicked: {}",
                self.name,
                panic_message(payload.as_ref())
            );
        }

        debug!("Finished test {} ({})", self.name, self.state);
        Ok(self.state)
    }

    /// Snapshot of the unit's current record
    pub fn summary(&self) -> UnitSummary {
        let duration_ms = self
            .duration()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        UnitSummary {
            name: self.name.clone(),
            state: self.state,
            duration_ms,
            started_at: self.started_at,
            failures: self.failures.iter().map(FailureSummary::from).collect(),
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(self.not_ready())
        }
    }

    fn not_ready(&self) -> Error {
        Error::InvalidState {
            unit: self.name.clone(),
            state: self.state,
        }
    }
}

impl fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_not_ready_before_invoke() {
        let unit = TestUnit::from_fn("Idle", |_| Ok(()));
        assert!(!unit.is_ready());
        assert_eq!(unit.state(), TestState::NotRun);
        assert!(matches!(unit.passed(), Err(Error::InvalidState { .. })));
        assert!(matches!(unit.duration(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_passing_unit() {
        let mut unit = TestUnit::from_fn("AddsCorrectly", |t| {
            t.assert_eq(2 + 2, 4)?;
            t.assert_true(true)
        });

        assert_eq!(unit.invoke(), Ok(TestState::Passed));
        assert!(unit.is_ready());
        assert_eq!(unit.passed(), Ok(true));
        assert!(unit.failures().is_empty());
        assert!(unit.duration().is_ok());
        assert!(unit.started_at().is_some());
    }

    #[test]
    fn test_fatal_assertion_stops_body() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);

        let mut unit = TestUnit::from_fn("DivByZero", move |t| {
            t.assert_true(false)?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(unit.invoke(), Ok(TestState::Failed));
        assert_eq!(unit.passed(), Ok(false));
        assert_eq!(unit.failures().len(), 1);
        assert!(unit.failures()[0].location.is_some());
        assert!(unit.failures()[0].error.is_none());
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[test]
    fn test_fatal_from_helper_context_fails_unit() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);

        let line = line!() + 3;
        let mut unit = TestUnit::from_fn("HelperStops", move |_| {
            let mut helper = TestContext::new();
            helper.assert_true(false)?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(unit.invoke(), Ok(TestState::Failed));
        assert!(!reached.load(Ordering::SeqCst));
        assert_eq!(unit.failures().len(), 1);
        assert_eq!(unit.failures()[0].location.as_ref().unwrap().line, line);
    }

    #[test]
    fn test_fatal_keeps_recorded_failures() {
        let mut unit = TestUnit::from_fn("RecordedOnce", |t| {
            t.expect_true(false);
            t.assert_eq(1, 2)
        });

        assert_eq!(unit.invoke(), Ok(TestState::Failed));
        assert_eq!(unit.failures().len(), 2);
    }

    #[test]
    fn test_soft_assertions_keep_running() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);

        let mut unit = TestUnit::from_fn("Soft", move |t| {
            t.expect_true(false);
            t.expect_eq("left", "right");
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(unit.invoke(), Ok(TestState::Failed));
        assert_eq!(unit.failures().len(), 2);
        assert!(reached.load(Ordering::SeqCst));
    }

    #[test]
    fn test_escaping_error_is_captured() {
        let mut unit = TestUnit::from_fn("Parses", |_| {
            let _: i32 = "not a number".parse()?;
            Ok(())
        });

        assert_eq!(unit.invoke(), Ok(TestState::FailedWithException));
        assert_eq!(unit.failures().len(), 1);
        let record = &unit.failures()[0];
        assert!(record.location.is_none());
        assert_eq!(
            record.error_message().as_deref(),
            Some("invalid digit found in string")
        );
    }

    #[test]
    fn test_panic_is_captured() {
        let mut unit = TestUnit::from_fn("Panics", |_| panic!("exploded"));

        assert_eq!(unit.invoke(), Ok(TestState::FailedWithException));
        assert_eq!(
            unit.failures()[0].error_message().as_deref(),
            Some("panicked: exploded")
        );
    }

    #[test]
    fn test_soft_failures_before_error() {
        let mut unit = TestUnit::from_fn("Mixed", |t| {
            t.expect_true(false);
            Err(Abort::error(anyhow!("gave up")))
        });

        assert_eq!(unit.invoke(), Ok(TestState::FailedWithException));
        assert_eq!(unit.failures().len(), 2);
    }

    #[test]
    fn test_second_invoke_is_rejected() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut unit = TestUnit::from_fn("Once", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        unit.invoke().unwrap();
        let duration = unit.duration().unwrap();

        assert_eq!(unit.invoke(), Err(Error::AlreadyInvoked("Once".to_string())));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(unit.state(), TestState::Passed);
        assert_eq!(unit.duration().unwrap(), duration);
    }

    struct Fixture {
        events: Arc<std::sync::Mutex<Vec<&'static str>>>,
        panic_in_setup: bool,
    }

    impl TestCase for Fixture {
        fn setup(&mut self) {
            self.events.lock().unwrap().push("setup");
            if self.panic_in_setup {
                panic!("no database");
            }
        }

        fn teardown(&mut self) {
            self.events.lock().unwrap().push("teardown");
        }

        fn run(&mut self, t: &mut TestContext) -> Outcome {
            self.events.lock().unwrap().push("run");
            t.assert_false(false)
        }
    }

    #[test]
    fn test_hooks_surround_body() {
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut unit = TestUnit::new(
            "Hooks",
            Fixture {
                events: Arc::clone(&events),
                panic_in_setup: false,
            },
        );

        assert_eq!(unit.invoke(), Ok(TestState::Passed));
        assert_eq!(*events.lock().unwrap(), vec!["setup", "run", "teardown"]);
    }

    #[test]
    fn test_setup_panic_skips_body() {
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut unit = TestUnit::new(
            "BrokenSetup",
            Fixture {
                events: Arc::clone(&events),
                panic_in_setup: true,
            },
        );

        assert_eq!(unit.invoke(), Ok(TestState::FailedWithException));
        assert_eq!(*events.lock().unwrap(), vec!["setup", "teardown"]);
        assert_eq!(
            unit.failures()[0].error_message().as_deref(),
            Some("setup panicked: no database")
        );
    }

    #[test]
    fn test_summary_snapshot() {
        let mut unit = TestUnit::from_fn("Snapshot", |t| t.fail("not implemented"));
        unit.invoke().unwrap();

        let summary = unit.summary();
        assert_eq!(summary.name, "Snapshot");
        assert_eq!(summary.state, TestState::Failed);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].detail.as_deref(), Some("not implemented"));
    }
}
