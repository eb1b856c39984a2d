//! CLI utilities for the `bird-bgp-agentx` binary.
//!
//! This module provides command-line argument parsing, `--once` output
//! formatting, and BGP4-MIB name hints.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod hints;
pub mod output;
