//! Struct-based tests with setup and teardown

use std::collections::BTreeMap;

use unitpool::{Outcome, Result, TestCase, TestContext, TestRegistry, TestUnit};

/// An in-memory inventory filled by `setup`
#[derive(Default)]
struct InventoryTest {
    stock: BTreeMap<&'static str, u32>,
}

impl InventoryTest {
    fn take(&mut self, item: &str, count: u32) -> anyhow::Result<u32> {
        let available = self
            .stock
            .get_mut(item)
            .ok_or_else(|| anyhow::anyhow!("unknown item: {item}"))?;
        if *available < count {
            anyhow::bail!("only {available} {item} left");
        }
        *available -= count;
        Ok(*available)
    }
}

impl TestCase for InventoryTest {
    fn setup(&mut self) {
        self.stock.insert("bolts", 10);
        self.stock.insert("nuts", 4);
    }

    fn teardown(&mut self) {
        self.stock.clear();
    }

    fn run(&mut self, t: &mut TestContext) -> Outcome {
        t.assert_eq(self.stock.len(), 2)?;

        let left = t.assert_does_not_throw(|| self.take("bolts", 3))?;
        t.assert_eq(left, 7)?;

        t.assert_throws_any(|| self.take("nuts", 5))?;
        t.assert_throws_any(|| self.take("washers", 1))?;
        t.assert_eq(self.stock.get("nuts"), Some(&4))
    }
}

/// Checks that soft failures are collected without stopping the body
struct SoftFailureTest;

impl TestCase for SoftFailureTest {
    fn run(&mut self, t: &mut TestContext) -> Outcome {
        let mut inner = TestContext::new();
        inner.expect_true(false);
        inner.expect_eq(1, 2);
        inner.fail_soft("explicit");

        t.assert_eq(inner.failures().len(), 3)?;
        t.assert_true(inner.failures().iter().all(|f| f.location.is_some()))
    }
}

pub fn register(registry: &mut TestRegistry) -> Result<()> {
    let collection = registry.add_collection("Fixtures")?;
    collection.add_test(TestUnit::new("Inventory", InventoryTest::default()))?;
    collection.add_test(TestUnit::new("SoftFailures", SoftFailureTest))?;
    Ok(())
}
