//! unitpool - a minimal unit-test execution engine
//!
//! Test units carry their own pass/fail state machine, are grouped into
//! named collections and run concurrently on a pausable worker pool. A
//! registry drives every collection and concatenates their reports.
//!
//! ## Example
//!
//! ```no_run
//! use unitpool::{TestRegistry, TestUnit};
//!
//! # async fn demo() -> unitpool::Result<()> {
//! let mut registry = TestRegistry::with_workers(4);
//! let math = registry.add_collection("Math")?;
//! math.add_test(TestUnit::from_fn("AddsCorrectly", |t| t.assert_eq(2 + 2, 4)))?;
//! math.add_test(TestUnit::from_fn("DividesByZero", |t| {
//!     t.assert_true(10i32.checked_div(0).is_some())?;
//!     Ok(())
//! }))?;
//!
//! registry.run_all().await?;
//! println!("{}", registry.generate_report().await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod unit;
pub mod utils;

pub use error::{Error, Result};
pub use executor::{JobHandle, TestCollection, TestRegistry, WorkerPool, REPORT_HEADER};
pub use models::{CollectionSummary, FailureRecord, SourceLocation, TestState, UnitSummary};
pub use unit::{Abort, FatalSignal, FnCase, Outcome, TestCase, TestContext, TestUnit};
