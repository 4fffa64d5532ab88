//! Test execution engine
//!
//! Worker pool, collections and the registry that drives them.

mod collection;
mod pool;
mod registry;

pub use collection::TestCollection;
pub use pool::{default_workers, JobHandle, WorkerPool};
pub use registry::{TestRegistry, REPORT_HEADER};
