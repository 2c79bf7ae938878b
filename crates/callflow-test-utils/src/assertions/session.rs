//! Assertion utilities for validating finished sessions.

use crate::implementations::RecordingLifecycle;
use callflow_core::{FlowKind, SessionState, SessionSummary};
use thiserror::Error;

/// Error type for session validation failures
#[derive(Debug, Error)]
pub enum SessionValidationError {
    #[error("Invalid session state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("close_session called {0} times, expected exactly once")]
    CloseCount(usize),

    #[error("Unexpected flow path: expected {expected}, got {actual}")]
    FlowPath { expected: String, actual: String },

    #[error("Unexpected step calls: expected {expected}, got {actual}")]
    StepCalls { expected: String, actual: String },
}

/// Asserts that the session reached `Terminated`.
pub fn assert_terminated(summary: &SessionSummary) -> Result<(), SessionValidationError> {
    if summary.state != SessionState::Terminated {
        return Err(SessionValidationError::InvalidState {
            expected: format!("{:?}", SessionState::Terminated),
            actual: format!("{:?}", summary.state),
        });
    }

    Ok(())
}

/// Asserts that the session layer was told to close exactly once.
pub fn assert_closed_once(lifecycle: &RecordingLifecycle) -> Result<(), SessionValidationError> {
    match lifecycle.close_count() {
        1 => Ok(()),
        n => Err(SessionValidationError::CloseCount(n)),
    }
}

/// Asserts the sequence of lists the session moved through.
///
/// # Arguments
///
/// * `lifecycle` - The recorder attached to the session
/// * `expected` - The lists in order, starting with `FlowKind::Main`
pub fn assert_flow_path(
    lifecycle: &RecordingLifecycle,
    expected: &[FlowKind],
) -> Result<(), SessionValidationError> {
    let actual = lifecycle.flow_path();
    if actual != expected {
        return Err(SessionValidationError::FlowPath {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        });
    }

    Ok(())
}

/// Asserts the exact order of recorded step calls.
pub fn assert_step_calls(
    actual: &[String],
    expected: &[&str],
) -> Result<(), SessionValidationError> {
    if actual.iter().map(String::as_str).ne(expected.iter().copied()) {
        return Err(SessionValidationError::StepCalls {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        });
    }

    Ok(())
}
