//! Test registry
//!
//! Owns every collection of a test run. Collections run one after another;
//! parallelism only happens inside a collection.

use std::time::Instant;
use tracing::info;

use super::collection::TestCollection;
use super::pool::default_workers;
use crate::error::{Error, Result};
use crate::models::CollectionSummary;

/// First line of every registry report
pub const REPORT_HEADER: &str = "Unit Test Report:";

/// Owner of all test collections
#[derive(Debug)]
pub struct TestRegistry {
    collections: Vec<TestCollection>,
    workers: usize,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::with_workers(default_workers())
    }

    /// Registry whose collections run `workers` units at a time
    pub fn with_workers(workers: usize) -> Self {
        Self {
            collections: Vec::new(),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Create a collection; names must be unique
    pub fn add_collection(&mut self, name: impl Into<String>) -> Result<&mut TestCollection> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(Error::DuplicateName(name));
        }

        self.collections
            .push(TestCollection::with_workers(name, self.workers));
        let index = self.collections.len() - 1;
        Ok(&mut self.collections[index])
    }

    pub fn get_collection(&self, name: &str) -> Result<&TestCollection> {
        self.position(name)
            .map(|i| &self.collections[i])
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn get_collection_mut(&mut self, name: &str) -> Result<&mut TestCollection> {
        match self.position(name) {
            Some(i) => Ok(&mut self.collections[i]),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    /// Collections in registration order
    pub fn collections(&self) -> impl Iterator<Item = &TestCollection> {
        self.collections.iter()
    }

    /// Run every collection, one at a time, in registration order
    pub async fn run_all(&mut self) -> Result<()> {
        info!("Running {} test collections", self.collections.len());
        let start = Instant::now();

        for collection in &mut self.collections {
            collection.run().await?;
        }

        info!(
            "All collections finished in {}ms",
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Header followed by each collection's report, in registration order
    pub async fn generate_report(&mut self) -> Result<String> {
        let mut report = format!("{REPORT_HEADER}\n");
        for collection in &mut self.collections {
            report.push_str(&collection.generate_report().await?);
        }
        Ok(report)
    }

    /// Structured snapshots of every collection, in registration order
    pub async fn summaries(&mut self) -> Result<Vec<CollectionSummary>> {
        let mut summaries = Vec::with_capacity(self.collections.len());
        for collection in &mut self.collections {
            summaries.push(collection.summary().await?);
        }
        Ok(summaries)
    }

    /// Drop every collection; queued units that have not started are cancelled
    pub fn reset(&mut self) {
        info!("Resetting registry ({} collections)", self.collections.len());
        self.collections.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.name() == name)
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::TestUnit;

    #[test]
    fn test_add_and_get_collection() {
        let mut registry = TestRegistry::with_workers(2);
        registry.add_collection("Test1").unwrap();
        registry.add_collection("Test2").unwrap();

        assert_eq!(registry.get_collection("Test1").unwrap().name(), "Test1");
        assert_eq!(registry.get_collection("Test2").unwrap().workers(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_missing_collection() {
        let registry = TestRegistry::with_workers(1);
        assert_eq!(
            registry.get_collection("missing").unwrap_err(),
            Error::NotFound("missing".to_string())
        );
    }

    #[test]
    fn test_duplicate_collection() {
        let mut registry = TestRegistry::with_workers(1);
        registry.add_collection("Math").unwrap();
        assert_eq!(
            registry.add_collection("Math").unwrap_err(),
            Error::DuplicateName("Math".to_string())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut registry = TestRegistry::with_workers(1);
        registry.add_collection("Math").unwrap();
        registry.reset();

        assert!(registry.is_empty());
        assert!(registry.get_collection("Math").is_err());
        registry.add_collection("Math").unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_report_concatenates_in_order() {
        let mut registry = TestRegistry::with_workers(2);
        registry
            .add_collection("Alpha")
            .unwrap()
            .add_test(TestUnit::from_fn("Passes", |t| t.assert_true(true)))
            .unwrap();
        registry
            .add_collection("Beta")
            .unwrap()
            .add_test(TestUnit::from_fn("Fails", |t| t.assert_true(false)))
            .unwrap();

        registry.run_all().await.unwrap();
        let report = registry.generate_report().await.unwrap();

        assert!(report.starts_with("Unit Test Report:\nTest Collection: Alpha\n"));
        let alpha = report.find("Test Collection: Alpha").unwrap();
        let beta = report.find("Test Collection: Beta").unwrap();
        assert!(alpha < beta);
        assert!(report.contains("Stats: failed 0 of 1 tests"));
        assert!(report.contains("Stats: failed 1 of 1 tests"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_summaries() {
        let mut registry = TestRegistry::with_workers(2);
        let collection = registry.add_collection("Math").unwrap();
        collection
            .add_test(TestUnit::from_fn("Adds", |t| t.assert_eq(1 + 1, 2)))
            .unwrap();

        let summaries = registry.summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_all_passed());
    }
}
