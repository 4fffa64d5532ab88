//! Test case capability
//!
//! Anything that provides a body, with optional setup and teardown hooks.

use super::context::{Outcome, TestContext};

/// A runnable test body with optional fixtures
pub trait TestCase: Send + 'static {
    /// Runs right before the body
    fn setup(&mut self) {}

    /// Runs right after the body, whatever its outcome
    fn teardown(&mut self) {}

    /// The test body
    fn run(&mut self, t: &mut TestContext) -> Outcome;
}

/// Adapter turning a closure into a [`TestCase`]
pub struct FnCase<F>(F);

impl<F> FnCase<F>
where
    F: FnMut(&mut TestContext) -> Outcome + Send + 'static,
{
    pub fn new(body: F) -> Self {
        Self(body)
    }
}

impl<F> TestCase for FnCase<F>
where
    F: FnMut(&mut TestContext) -> Outcome + Send + 'static,
{
    fn run(&mut self, t: &mut TestContext) -> Outcome {
        (self.0)(t)
    }
}
