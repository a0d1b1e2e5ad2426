//! Run configuration and its validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::HarnessError;
use crate::rwlock::LockKind;

/// Default ceiling on the total number of worker threads in one run.
pub const DEFAULT_MAX_WORKERS: usize = 4096;

/// Configuration for one bounded run.
///
/// Immutable once a run starts. Fields missing from a JSON document take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Reader workers to spawn.
    pub readers: usize,
    /// Writer workers to spawn.
    pub writers: usize,
    /// Downgrader workers to spawn.
    pub downgraders: usize,
    /// Seconds before the stop flag is raised. Must be positive.
    pub duration_secs: u64,
    /// Yield the CPU after every loop iteration.
    pub cooperative_yield: bool,
    /// Lock implementation for configured runs.
    pub lock: LockKind,
    /// Also run a sampling monitor thread.
    pub monitor: bool,
    /// Ceiling on `readers + writers + downgraders`.
    pub max_workers: usize,
    /// Violations kept in full detail; the rest are only counted.
    pub max_recorded_violations: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            readers: 1,
            writers: 1,
            downgraders: 1,
            duration_secs: 5,
            cooperative_yield: false,
            lock: LockKind::default(),
            monitor: false,
            max_workers: DEFAULT_MAX_WORKERS,
            max_recorded_violations: 256,
        }
    }
}

impl HarnessConfig {
    /// Configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reader count.
    #[must_use]
    pub const fn with_readers(mut self, readers: usize) -> Self {
        self.readers = readers;
        self
    }

    /// Set the writer count.
    #[must_use]
    pub const fn with_writers(mut self, writers: usize) -> Self {
        self.writers = writers;
        self
    }

    /// Set the downgrader count.
    #[must_use]
    pub const fn with_downgraders(mut self, downgraders: usize) -> Self {
        self.downgraders = downgraders;
        self
    }

    /// Set the run duration in seconds.
    #[must_use]
    pub const fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Enable or disable the per-iteration yield.
    #[must_use]
    pub const fn with_cooperative_yield(mut self, enabled: bool) -> Self {
        self.cooperative_yield = enabled;
        self
    }

    /// Select the lock implementation.
    #[must_use]
    pub const fn with_lock(mut self, lock: LockKind) -> Self {
        self.lock = lock;
        self
    }

    /// Enable or disable the monitor thread.
    #[must_use]
    pub const fn with_monitor(mut self, enabled: bool) -> Self {
        self.monitor = enabled;
        self
    }

    /// Set the worker ceiling.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set how many violations are kept in full.
    #[must_use]
    pub const fn with_max_recorded_violations(mut self, max: usize) -> Self {
        self.max_recorded_violations = max;
        self
    }

    /// Readers, writers and downgraders combined.
    #[must_use]
    pub const fn total_workers(&self) -> usize {
        self.readers
            .saturating_add(self.writers)
            .saturating_add(self.downgraders)
    }

    /// Run duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_secs == 0 {
            return Err("duration_secs must be greater than 0".into());
        }
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        let total = self.total_workers();
        if total > self.max_workers {
            return Err(format!(
                "{total} workers requested (readers={}, writers={}, downgraders={}), ceiling is {}",
                self.readers, self.writers, self.downgraders, self.max_workers
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Parse` for malformed JSON (including negative
    /// counts) and `HarnessError::Config` for invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, HarnessError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate().map_err(HarnessError::Config)?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As [`from_json_str`](Self::from_json_str), plus `HarnessError::Io` if
    /// the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.readers, 1);
        assert_eq!(cfg.writers, 1);
        assert_eq!(cfg.downgraders, 1);
        assert_eq!(cfg.duration_secs, 5);
        assert!(!cfg.cooperative_yield);
        assert_eq!(cfg.lock, LockKind::ParkingLot);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let cfg = HarnessConfig::new().with_duration_secs(0);
        assert!(cfg.validate().unwrap_err().contains("duration_secs"));
    }

    #[test]
    fn test_ceiling_enforced() {
        let cfg = HarnessConfig::new()
            .with_readers(10)
            .with_writers(10)
            .with_downgraders(10)
            .with_max_workers(25);
        assert!(cfg.validate().unwrap_err().contains("ceiling is 25"));

        // More than the old fixed 20 per role is fine under the ceiling.
        let cfg = HarnessConfig::new().with_readers(64).with_max_workers(100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_total_workers_saturates() {
        let cfg = HarnessConfig::new().with_readers(usize::MAX).with_writers(5);
        assert_eq!(cfg.total_workers(), usize::MAX);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_workers_allowed() {
        let cfg = HarnessConfig::new()
            .with_readers(0)
            .with_writers(0)
            .with_downgraders(0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let cfg = HarnessConfig::from_json_str(r#"{ "readers": 5, "lock": "counting" }"#).unwrap();
        assert_eq!(cfg.readers, 5);
        assert_eq!(cfg.writers, 1);
        assert_eq!(cfg.lock, LockKind::Counting);
        assert_eq!(cfg.duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_negative_count_is_parse_error() {
        let err = HarnessConfig::from_json_str(r#"{ "writers": -1 }"#).unwrap_err();
        assert!(matches!(err, HarnessError::Parse(_)));
    }

    #[test]
    fn test_invalid_json_values_are_config_error() {
        let err = HarnessConfig::from_json_str(r#"{ "duration_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }
}
