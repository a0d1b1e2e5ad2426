//! Error types for harness runs.

use thiserror::Error;

/// Errors that prevent a run from producing a report.
///
/// Invariant violations are not errors: they are collected into the report.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A worker or the stop timer could not be started. Workers already
    /// running were stopped and joined.
    #[error("setup failure: could not spawn `{label}`: {source}")]
    SetupFailure {
        /// Label of the thread that failed to start.
        label: String,
        /// Underlying OS error.
        source: std::io::Error,
    },
    /// Configuration file could not be read.
    #[error("configuration io error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
