//! Shared test utilities for bird-bgp-agentx integration tests.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

mod fixtures;
mod mock;

pub use fixtures::*;
pub use mock::*;
