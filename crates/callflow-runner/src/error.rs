//! Error types for the callflow runner

use callflow_core::CoreError;
use thiserror::Error;

/// Runner error types
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Logging could not be set up
    #[error("Telemetry error: {0}")]
    TelemetryError(String),

    /// The session controller failed
    #[error("Session error: {0}")]
    SessionError(#[from] CoreError),
}

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;
