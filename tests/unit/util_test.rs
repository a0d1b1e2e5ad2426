//! Tests for utility functions

use rwsem_stress::util::{init_tracing, init_tracing_with, now_ms};

#[test]
fn test_now_ms_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(now_ms() > 1_577_836_800_000);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing_with("debug");
    tracing::info!("tracing initialized twice without panicking");
}
