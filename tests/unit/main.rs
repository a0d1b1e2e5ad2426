//! Unit tests for individual components

mod checker_test;
mod config_test;
mod error_test;
mod runtime_test;
mod util_test;
