//! Arithmetic tests

use unitpool::{Result, TestRegistry, TestUnit};

pub fn register(registry: &mut TestRegistry) -> Result<()> {
    let collection = registry.add_collection("Arithmetic")?;

    collection.add_test(TestUnit::from_fn("AddsCorrectly", |t| {
        t.assert_eq(2 + 2, 4)?;
        t.assert_ne(2 + 2, 5)
    }))?;

    collection.add_test(TestUnit::from_fn("CheckedDivisionByZero", |t| {
        t.assert_eq(10i32.checked_div(0), None)?;
        t.assert_eq(10i32.checked_div(3), Some(3))
    }))?;

    collection.add_test(TestUnit::from_fn("DetectsOverflow", |t| {
        t.assert_true(i32::MAX.checked_add(1).is_none())?;
        t.assert_eq(i32::MAX.wrapping_add(1), i32::MIN)?;
        t.assert_false(u8::MAX.checked_sub(1).is_none())
    }))?;

    collection.add_test(TestUnit::from_fn("SumsSequence", |t| {
        let total: u64 = (1..=100).sum();
        t.expect_eq(total, 5050);
        t.expect_eq((1..=10u64).product::<u64>(), 3_628_800);
        Ok(())
    }))?;

    Ok(())
}
