//! Built-in test collections
//!
//! There is no test discovery: every collection the binary runs is
//! registered here.
//!
//! ### Arithmetic
//! - Integer addition, checked division and overflow detection
//!
//! ### Parsing
//! - Number and boolean parsing, including the errors they raise
//!
//! ### Fixtures
//! - Struct-based tests with setup and teardown hooks

mod arithmetic;
mod fixtures;
mod parsing;

use unitpool::{Result, TestRegistry};

/// Register every built-in collection
pub fn register_all(registry: &mut TestRegistry) -> Result<()> {
    arithmetic::register(registry)?;
    parsing::register(registry)?;
    fixtures::register(registry)?;
    Ok(())
}
