//! Assertion primitives
//!
//! Every assertion comes in two flavours. The `assert_*` methods are fatal:
//! on violation they record a failure and return `Err(Abort::Fatal)`, which
//! the test body propagates with `?` to stop immediately. The `expect_*`
//! methods are soft: they record the failure, return `false` and let the
//! body continue.
//!
//! Closures passed to the throw checks "throw" by returning `Err` or by
//! panicking.

use anyhow::anyhow;
use std::any::{type_name, Any};
use std::fmt::{self, Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use tracing::trace;

use crate::models::{FailureRecord, SourceLocation};

/// Signal that ends a test body early
pub enum Abort {
    /// A fatal assertion failed; only [`TestContext`] can raise it
    Fatal(FatalSignal),
    /// An error escaped the test body
    Error(anyhow::Error),
}

impl Abort {
    /// Wrap any error, including `anyhow::Error`, as an escaping error
    pub fn error(error: impl Into<anyhow::Error>) -> Self {
        Abort::Error(error.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Abort::Fatal(_))
    }
}

/// Location of the fatal assertion that stopped a body
pub struct FatalSignal {
    location: SourceLocation,
}

impl FatalSignal {
    #[track_caller]
    pub(crate) fn raise() -> Self {
        Self {
            location: SourceLocation::caller(),
        }
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub(crate) fn into_location(self) -> SourceLocation {
        self.location
    }
}

impl Display for FatalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.location, f)
    }
}

impl<E> From<E> for Abort
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Abort::Error(anyhow::Error::new(error))
    }
}

impl Debug for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abort::Fatal(signal) => write!(f, "Fatal({signal})"),
            Abort::Error(error) => write!(f, "Error({error:#})"),
        }
    }
}

/// Result of a test body
pub type Outcome = Result<(), Abort>;

enum Verdict {
    Pass,
    Fail(Option<String>),
    Raised(Option<String>, anyhow::Error),
}

/// Failure accumulator handed to a running test body
#[derive(Debug, Default)]
pub struct TestContext {
    failures: Vec<FailureRecord>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures recorded so far
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn record(&mut self, record: FailureRecord) {
        self.failures.push(record);
    }

    pub(crate) fn into_failures(self) -> Vec<FailureRecord> {
        self.failures
    }

    #[track_caller]
    pub fn assert_true(&mut self, condition: bool) -> Outcome {
        self.fatal(truth(condition, true))
    }

    #[track_caller]
    pub fn expect_true(&mut self, condition: bool) -> bool {
        self.settle(truth(condition, true))
    }

    #[track_caller]
    pub fn assert_false(&mut self, condition: bool) -> Outcome {
        self.fatal(truth(condition, false))
    }

    #[track_caller]
    pub fn expect_false(&mut self, condition: bool) -> bool {
        self.settle(truth(condition, false))
    }

    #[track_caller]
    pub fn assert_eq<L, R>(&mut self, left: L, right: R) -> Outcome
    where
        L: PartialEq<R> + Debug,
        R: Debug,
    {
        self.fatal(compare(&left, &right, true))
    }

    #[track_caller]
    pub fn expect_eq<L, R>(&mut self, left: L, right: R) -> bool
    where
        L: PartialEq<R> + Debug,
        R: Debug,
    {
        self.settle(compare(&left, &right, true))
    }

    #[track_caller]
    pub fn assert_ne<L, R>(&mut self, left: L, right: R) -> Outcome
    where
        L: PartialEq<R> + Debug,
        R: Debug,
    {
        self.fatal(compare(&left, &right, false))
    }

    #[track_caller]
    pub fn expect_ne<L, R>(&mut self, left: L, right: R) -> bool
    where
        L: PartialEq<R> + Debug,
        R: Debug,
    {
        self.settle(compare(&left, &right, false))
    }

    /// Passes when `f` fails with an error of type `E`
    ///
    /// Succeeding is a plain failure; failing with any other error records
    /// that error alongside the failure.
    #[track_caller]
    pub fn assert_throws<E, T>(&mut self, f: impl FnOnce() -> anyhow::Result<T>) -> Outcome
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.fatal(throws::<E, T>(f))
    }

    #[track_caller]
    pub fn expect_throws<E, T>(&mut self, f: impl FnOnce() -> anyhow::Result<T>) -> bool
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.settle(throws::<E, T>(f))
    }

    /// Passes when `f` fails in any way
    #[track_caller]
    pub fn assert_throws_any<T>(&mut self, f: impl FnOnce() -> anyhow::Result<T>) -> Outcome {
        self.fatal(throws_any(f))
    }

    #[track_caller]
    pub fn expect_throws_any<T>(&mut self, f: impl FnOnce() -> anyhow::Result<T>) -> bool {
        self.settle(throws_any(f))
    }

    /// Passes when `f` succeeds, handing back its value
    #[track_caller]
    pub fn assert_does_not_throw<T>(
        &mut self,
        f: impl FnOnce() -> anyhow::Result<T>,
    ) -> Result<T, Abort> {
        match catch(f) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.settle(Verdict::Raised(None, error));
                Err(Abort::Fatal(FatalSignal::raise()))
            }
        }
    }

    #[track_caller]
    pub fn expect_does_not_throw<T>(&mut self, f: impl FnOnce() -> anyhow::Result<T>) -> Option<T> {
        match catch(f) {
            Ok(value) => Some(value),
            Err(error) => {
                self.settle(Verdict::Raised(None, error));
                None
            }
        }
    }

    /// Unconditional fatal failure
    #[track_caller]
    pub fn fail(&mut self, message: impl Into<String>) -> Outcome {
        self.fatal(Verdict::Fail(Some(message.into())))
    }

    /// Unconditional soft failure
    #[track_caller]
    pub fn fail_soft(&mut self, message: impl Into<String>) {
        self.settle(Verdict::Fail(Some(message.into())));
    }

    #[track_caller]
    fn fatal(&mut self, verdict: Verdict) -> Outcome {
        if self.settle(verdict) {
            Ok(())
        } else {
            Err(Abort::Fatal(FatalSignal::raise()))
        }
    }

    #[track_caller]
    fn settle(&mut self, verdict: Verdict) -> bool {
        let location = SourceLocation::caller();
        let record = match verdict {
            Verdict::Pass => return true,
            Verdict::Fail(detail) => FailureRecord {
                location: Some(location),
                detail,
                error: None,
            },
            Verdict::Raised(detail, error) => FailureRecord {
                location: Some(location),
                detail,
                error: Some(error),
            },
        };

        trace!("Assertion failed at {}", record);
        self.failures.push(record);
        false
    }
}

fn truth(condition: bool, expected: bool) -> Verdict {
    if condition == expected {
        Verdict::Pass
    } else {
        Verdict::Fail(Some(format!("expected condition to be {expected}")))
    }
}

fn compare<L, R>(left: &L, right: &R, equal: bool) -> Verdict
where
    L: PartialEq<R> + Debug,
    R: Debug,
{
    if (left == right) == equal {
        return Verdict::Pass;
    }
    let op = if equal { "==" } else { "!=" };
    Verdict::Fail(Some(format!(
        "assertion `left {op} right` failed (left: {left:?}, right: {right:?})"
    )))
}

fn throws<E, T>(f: impl FnOnce() -> anyhow::Result<T>) -> Verdict
where
    E: Display + Debug + Send + Sync + 'static,
{
    let expected = type_name::<E>();
    match catch(f) {
        Ok(_) => Verdict::Fail(Some(format!("expected an error of type `{expected}`"))),
        Err(error) if error.is::<E>() => Verdict::Pass,
        Err(error) => Verdict::Raised(
            Some(format!("expected an error of type `{expected}`")),
            error,
        ),
    }
}

fn throws_any<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Verdict {
    match catch(f) {
        Ok(_) => Verdict::Fail(Some("expected an error".to_string())),
        Err(_) => Verdict::Pass,
    }
}

/// Run `f`, turning a panic into an error
pub(crate) fn catch<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

/// Message carried by a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::ParseIntError;

    #[test]
    fn test_passing_assertions_record_nothing() {
        let mut t = TestContext::new();
        assert!(t.assert_true(true).is_ok());
        assert!(t.assert_false(false).is_ok());
        assert!(t.assert_eq(2 + 2, 4).is_ok());
        assert!(t.assert_ne("a", "b").is_ok());
        assert!(!t.has_failures());
    }

    #[test]
    fn test_fatal_assertion_records_location() {
        let mut t = TestContext::new();
        let line = line!() + 1;
        let outcome = t.assert_true(false);

        match outcome {
            Err(Abort::Fatal(signal)) => {
                let location = signal.location();
                assert_eq!(location.line, line);
                assert!(location.file.ends_with("context.rs"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(t.failures().len(), 1);
        assert_eq!(t.failures()[0].location.as_ref().unwrap().line, line);
    }

    #[test]
    fn test_soft_assertions_accumulate() {
        let mut t = TestContext::new();
        assert!(!t.expect_eq(1, 2));
        assert!(!t.expect_false(true));
        assert!(t.expect_ne(1, 2));
        assert_eq!(t.failures().len(), 2);
        assert!(t.failures()[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("left: 1, right: 2"));
    }

    #[test]
    fn test_assert_throws_matches_error_type() {
        let mut t = TestContext::new();
        let outcome = t.assert_throws::<ParseIntError, _>(|| Ok("x1".parse::<i32>()?));
        assert!(outcome.is_ok());
        assert!(!t.has_failures());
    }

    #[test]
    fn test_assert_throws_without_error_fails() {
        let mut t = TestContext::new();
        let outcome = t.assert_throws::<ParseIntError, _>(|| Ok("12".parse::<i32>()?));
        assert!(outcome.is_err());
        assert!(t.failures()[0].error.is_none());
    }

    #[test]
    fn test_assert_throws_wrong_type_captures_error() {
        let mut t = TestContext::new();
        let outcome = t.assert_throws::<ParseIntError, ()>(|| Err(anyhow!("disk full")));
        assert!(outcome.is_err());
        assert_eq!(t.failures()[0].error_message().as_deref(), Some("disk full"));
    }

    #[test]
    fn test_throws_any_accepts_panics() {
        let mut t = TestContext::new();
        assert!(t.expect_throws_any(|| -> anyhow::Result<()> { panic!("boom") }));
        assert!(!t.expect_throws_any(|| Ok(1)));
        assert_eq!(t.failures().len(), 1);
    }

    #[test]
    fn test_does_not_throw_returns_value() {
        let mut t = TestContext::new();
        let value = t.assert_does_not_throw(|| Ok("42".parse::<i32>()?));
        assert_eq!(value.ok(), Some(42));

        let missing = t.expect_does_not_throw(|| Ok("forty".parse::<i32>()?));
        assert!(missing.is_none());
        assert!(t.failures()[0].error.is_some());
    }

    #[test]
    fn test_std_errors_convert_to_abort() {
        fn body() -> Outcome {
            "nope".parse::<u8>()?;
            Ok(())
        }
        let abort = body().unwrap_err();
        assert!(!abort.is_fatal());
    }

    #[test]
    fn test_panic_message() {
        let err = catch(|| -> anyhow::Result<()> { panic!("index {} out of range", 3) })
            .unwrap_err();
        assert_eq!(err.to_string(), "panicked: index 3 out of range");
    }
}
