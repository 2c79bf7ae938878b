use thiserror::Error;

/// Error types for the test utilities
#[derive(Debug, Error)]
pub enum TestError {
    /// The controller failed
    #[error("Controller error: {0}")]
    Core(#[from] callflow_core::CoreError),

    /// A session assertion failed
    #[error("Session validation failed: {0}")]
    Validation(#[from] crate::assertions::SessionValidationError),

    /// The session did not finish in time
    #[error("Timeout error: {0}")]
    Timeout(String),
}
