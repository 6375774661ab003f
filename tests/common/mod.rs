//! Common test utilities for courier CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated environment with fake ssh/scp tools
//! - `TestResult`: captured exit code and output

#![allow(dead_code)]

pub mod env;

pub use env::*;
