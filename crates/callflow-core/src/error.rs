use thiserror::Error;

/// Core error type for the callflow executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A step failed internally
    #[error("Step execution error: {0}")]
    StepExecutionError(String),

    /// Variable lookup failed
    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    /// Timer error
    #[error("Timer error: {0}")]
    TimerError(String),

    /// The event queue has no producers left or was closed
    #[error("Event queue closed for session: {0}")]
    EventQueueClosed(String),

    /// Condition evaluation error
    #[error("Condition evaluation error: {0}")]
    ConditionEvaluationError(String),

    /// The session was asked to do something its state does not allow
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// External dependency error (telephony layer, remote services)
    #[error("External dependency error: {0}")]
    ExternalDependencyError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigurationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
