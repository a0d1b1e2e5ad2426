//! Tests for configuration validation

use rwsem_stress::config::{HarnessConfig, DEFAULT_MAX_WORKERS};
use rwsem_stress::core::HarnessError;
use rwsem_stress::rwlock::LockKind;

use rand::Rng;

#[test]
fn test_default_config_is_valid() {
    let config = HarnessConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
}

#[test]
fn test_config_invalid_duration() {
    let invalid = HarnessConfig::new().with_duration_secs(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_ceiling() {
    let invalid = HarnessConfig::new().with_max_workers(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_random_configs_validate_against_ceiling() {
    let mut rng = rand::rng();

    for _ in 0..500 {
        let readers = rng.random_range(0..200);
        let writers = rng.random_range(0..200);
        let downgraders = rng.random_range(0..200);
        let max_workers = rng.random_range(1..600);
        let duration = rng.random_range(0..10);

        let config = HarnessConfig::new()
            .with_readers(readers)
            .with_writers(writers)
            .with_downgraders(downgraders)
            .with_max_workers(max_workers)
            .with_duration_secs(duration);

        let expected_ok = duration > 0 && readers + writers + downgraders <= max_workers;
        assert_eq!(config.validate().is_ok(), expected_ok, "{config:?}");
    }
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "readers": 3,
        "writers": 3,
        "downgraders": 0,
        "duration_secs": 3,
        "cooperative_yield": true,
        "lock": "parking_lot",
        "monitor": true
    }"#;

    let config = HarnessConfig::from_json_str(json).unwrap();
    assert_eq!(config.readers, 3);
    assert_eq!(config.downgraders, 0);
    assert!(config.cooperative_yield);
    assert!(config.monitor);
    assert_eq!(config.lock, LockKind::ParkingLot);
}

#[test]
fn test_config_json_round_trip_keeps_values() {
    let config = HarnessConfig::new()
        .with_readers(7)
        .with_lock(LockKind::SplitDowngrade)
        .with_max_recorded_violations(3);

    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(HarnessConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_config_from_missing_file() {
    let err = HarnessConfig::from_file("/nonexistent/rwsem-stress.json").unwrap_err();
    assert!(matches!(err, HarnessError::Io(_)));
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("rwsem-stress-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "writers": 4, "duration_secs": 2 }"#).unwrap();

    let config = HarnessConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.writers, 4);
    assert_eq!(config.duration_secs, 2);
    assert_eq!(config.readers, 1);
}
