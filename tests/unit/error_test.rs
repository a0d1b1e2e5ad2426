//! Tests for error types

use std::io;

use rwsem_stress::core::HarnessError;

#[test]
fn test_config_error() {
    let err = HarnessError::Config("duration_secs must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: duration_secs must be greater than 0"
    );
}

#[test]
fn test_setup_failure_error() {
    let err = HarnessError::SetupFailure {
        label: "write-3".to_string(),
        source: io::Error::other("out of threads"),
    };
    assert_eq!(
        format!("{}", err),
        "setup failure: could not spawn `write-3`: out of threads"
    );
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_parse_error_from_serde() {
    let serde_err = serde_json::from_str::<u32>("not json").unwrap_err();
    let err: HarnessError = serde_err.into();
    assert!(format!("{}", err).starts_with("configuration parse error:"));
}
