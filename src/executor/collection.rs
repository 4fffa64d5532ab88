//! Test collections
//!
//! A named group of units sharing one worker pool. Units are queued on the
//! paused pool as they are added and only start once the collection runs.

use futures::future::join_all;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::pool::{JobHandle, WorkerPool};
use crate::error::Result;
use crate::models::{CollectionSummary, TestState};
use crate::unit::TestUnit;

type SharedUnit = Arc<Mutex<TestUnit>>;

/// Named group of test units executed and reported together
pub struct TestCollection {
    name: String,
    units: Vec<SharedUnit>,
    handles: Vec<JobHandle<Result<TestState>>>,
    pool: WorkerPool,
}

impl TestCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_pool(name, WorkerPool::default())
    }

    pub fn with_workers(name: impl Into<String>, workers: usize) -> Self {
        Self::with_pool(name, WorkerPool::new(workers))
    }

    fn with_pool(name: impl Into<String>, pool: WorkerPool) -> Self {
        pool.pause();
        Self {
            name: name.into(),
            units: Vec::new(),
            handles: Vec::new(),
            pool,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Register a unit and queue its invocation
    ///
    /// Nothing runs until [`TestCollection::run`] is called. Must be called
    /// from within a Tokio runtime.
    pub fn add_test(&mut self, unit: TestUnit) -> Result<()> {
        debug!("Queueing test {} in collection {}", unit.name(), self.name);

        let unit = Arc::new(Mutex::new(unit));
        let job_unit = Arc::clone(&unit);
        let handle = self.pool.submit(move || lock(&job_unit).invoke())?;

        self.units.push(unit);
        self.handles.push(handle);
        Ok(())
    }

    /// Number of queued or running units
    pub fn pending(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Whether every queued unit has finished
    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    /// Release the pool and wait for every queued unit to finish
    ///
    /// Calling it again only waits on units that are still unfinished.
    pub async fn run(&mut self) -> Result<()> {
        if self.is_complete() && !self.pool.has_pending_work() {
            debug!("Collection {} has nothing left to run", self.name);
            self.pool.resume();
            return Ok(());
        }

        info!(
            "Running collection {} ({} tests, {} workers)",
            self.name,
            self.units.len(),
            self.pool.workers()
        );

        let start = Instant::now();
        self.pool.resume();

        let outcomes = join_all(self.handles.iter_mut().map(|handle| handle.wait())).await;

        let mut first_error = None;
        for (unit, outcome) in self.units.iter().zip(outcomes) {
            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Test in collection {}: {}", self.name, e),
                Err(e) => {
                    warn!("Test {} did not run: {}", lock(unit).name(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(
            "Collection {} finished in {}ms",
            self.name,
            start.elapsed().as_millis()
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Render the failure report, running pending units first
    pub async fn generate_report(&mut self) -> Result<String> {
        self.settle().await?;

        let mut report = String::new();
        let _ = writeln!(report, "Test Collection: {}", self.name);

        let mut failed = 0;
        for unit in &self.units {
            let unit = lock(unit);
            if !unit.passed()? {
                failed += 1;
                report.push_str(&failure_block(&unit));
            }
        }

        let _ = writeln!(
            report,
            "Stats: failed {} of {} tests",
            failed,
            self.units.len()
        );
        Ok(report)
    }

    /// Structured snapshot of every unit, running pending units first
    pub async fn summary(&mut self) -> Result<CollectionSummary> {
        self.settle().await?;

        let units = self.units.iter().map(|unit| lock(unit).summary()).collect();
        Ok(CollectionSummary::new(self.name.clone(), units))
    }

    /// Names of the registered units, in registration order
    pub fn unit_names(&self) -> Vec<String> {
        self.units
            .iter()
            .map(|unit| lock(unit).name().to_string())
            .collect()
    }

    async fn settle(&mut self) -> Result<()> {
        if !self.is_complete() || self.pool.has_pending_work() {
            self.run().await?;
        }
        Ok(())
    }
}

impl Drop for TestCollection {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for TestCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCollection")
            .field("name", &self.name)
            .field("units", &self.units.len())
            .field("workers", &self.pool.workers())
            .finish()
    }
}

fn lock(unit: &SharedUnit) -> MutexGuard<'_, TestUnit> {
    unit.lock().unwrap_or_else(PoisonError::into_inner)
}

fn failure_block(unit: &TestUnit) -> String {
    let mut block = String::new();
    let _ = writeln!(block, "\tTest failed: {}", unit.name());

    for failure in unit.failures() {
        if let Some(location) = &failure.location {
            let _ = writeln!(block, "\t File: {location}");
        }
        if let Some(detail) = &failure.detail {
            let _ = writeln!(block, "\t Detail: {detail}");
        }
        if let Some(message) = failure.error_message() {
            let _ = writeln!(block, "\t Exception: {message}");
        }
        block.push('\n');
    }

    block
}
