//! Pausable worker pool
//!
//! Jobs are synchronous closures. Each submitted job becomes a Tokio task
//! that waits for the pool to be resumed, takes one of `workers` permits and
//! then runs the closure on the blocking thread pool. A pool starts paused,
//! so jobs can be queued before anything executes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::error::{Error, Result};

/// Bounded, pausable job executor
pub struct WorkerPool {
    workers: usize,
    permits: Arc<Semaphore>,
    paused: watch::Sender<bool>,
    pending: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create a paused pool running at most `workers` jobs at once
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (paused, _) = watch::channel(true);

        Self {
            workers,
            permits: Arc::new(Semaphore::new(workers)),
            paused,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Stop starting new jobs; running jobs are not interrupted
    ///
    /// Jobs already past the gate and waiting for a worker still start.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Whether any submitted job has not finished yet
    pub fn has_pending_work(&self) -> bool {
        self.pending_jobs() > 0
    }

    pub fn pending_jobs(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Queue a job; it starts once the pool is running and a worker is free
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit<F, T>(&self, job: F) -> Result<JobHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let mut gate = self.paused.subscribe();
        let permits = Arc::clone(&self.permits);
        let pending = PendingGuard::enter(Arc::clone(&self.pending));

        let task = runtime.spawn(async move {
            let _pending = pending;

            let opened = gate.wait_for(|paused| !*paused).await.is_ok();
            if !opened {
                return Err(Error::JobFailed("worker pool was dropped".to_string()));
            }

            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| Error::JobFailed(e.to_string()))?;

            trace!("Worker picked up a job");
            tokio::task::spawn_blocking(job)
                .await
                .map_err(|e| Error::JobFailed(e.to_string()))
        });

        Ok(JobHandle {
            state: JobState::Running(task),
        })
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

/// Worker count matching the machine's available parallelism
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

enum JobState<T> {
    Running(JoinHandle<Result<T>>),
    Finished(Result<T>),
}

/// Completion handle for a submitted job
pub struct JobHandle<T> {
    state: JobState<T>,
}

impl<T> JobHandle<T> {
    /// Wait for the job to finish and borrow its output
    ///
    /// Waiting again returns the cached outcome immediately.
    pub async fn wait(&mut self) -> Result<&T> {
        if let JobState::Running(task) = &mut self.state {
            let outcome = match task.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(Error::JobFailed("job was cancelled".to_string())),
                Err(e) => Err(Error::JobFailed(e.to_string())),
            };
            self.state = JobState::Finished(outcome);
        }

        match &self.state {
            JobState::Finished(Ok(output)) => Ok(output),
            JobState::Finished(Err(e)) => Err(e.clone()),
            JobState::Running(_) => Err(Error::JobFailed("job is still running".to_string())),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            JobState::Running(task) => task.is_finished(),
            JobState::Finished(_) => true,
        }
    }

    /// Output of a job that has already been waited on
    pub fn output(&self) -> Option<&T> {
        match &self.state {
            JobState::Finished(Ok(output)) => Some(output),
            _ => None,
        }
    }

    /// Cancel the job if it has not started running
    pub fn abort(&self) {
        if let JobState::Running(task) = &self.state {
            task.abort();
        }
    }
}
