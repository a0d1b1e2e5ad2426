//! Harness configuration.

pub mod harness;

pub use harness::{HarnessConfig, DEFAULT_MAX_WORKERS};
