//! Parsing tests

use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use unitpool::{Result, TestRegistry, TestUnit};

pub fn register(registry: &mut TestRegistry) -> Result<()> {
    let collection = registry.add_collection("Parsing")?;

    collection.add_test(TestUnit::from_fn("ParsesIntegers", |t| {
        let value = t.assert_does_not_throw(|| Ok("1024".parse::<u32>()?))?;
        t.assert_eq(value, 1024)?;
        t.assert_throws::<ParseIntError, _>(|| Ok("12ab".parse::<u32>()?))?;
        t.assert_throws::<ParseIntError, _>(|| Ok("-1".parse::<u32>()?))
    }))?;

    collection.add_test(TestUnit::from_fn("ParsesFloats", |t| {
        let value: f64 = "2.5".parse()?;
        t.assert_true((value - 2.5).abs() < f64::EPSILON)?;
        t.assert_throws::<ParseFloatError, _>(|| Ok("two".parse::<f64>()?))
    }))?;

    collection.add_test(TestUnit::from_fn("ParsesBooleans", |t| {
        t.expect_eq("true".parse::<bool>().ok(), Some(true));
        t.expect_eq("false".parse::<bool>().ok(), Some(false));
        t.expect_throws::<ParseBoolError, _>(|| Ok("yes".parse::<bool>()?));
        Ok(())
    }))?;

    collection.add_test(TestUnit::from_fn("RejectsEmptyInput", |t| {
        t.assert_throws_any(|| Ok("".parse::<i64>()?))?;
        t.assert_throws_any(|| Ok("".parse::<f32>()?))
    }))?;

    Ok(())
}
