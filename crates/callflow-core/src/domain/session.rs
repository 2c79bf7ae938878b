use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value object: Session ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh random session id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value object: Correlation token tying an event to the wait it satisfies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationToken(pub String);

impl CorrelationToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three step lists a session owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    /// The main flow
    Main,
    /// The error handler flow
    Error,
    /// The disconnect/cleanup flow
    Disconnect,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowKind::Main => "main",
            FlowKind::Error => "error",
            FlowKind::Disconnect => "disconnect",
        };
        f.write_str(name)
    }
}

/// Controller state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Created, not started yet
    Idle,
    /// Executing the main list
    RunningMain,
    /// Executing the error handler list
    RunningError,
    /// Executing the disconnect handler list
    RunningDisconnect,
    /// Finished; no step will run again
    Terminated,
}

impl SessionState {
    fn running(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Main => SessionState::RunningMain,
            FlowKind::Error => SessionState::RunningError,
            FlowKind::Disconnect => SessionState::RunningDisconnect,
        }
    }
}

/// Aggregate: one end-to-end run of a call flow
///
/// The session only tracks where the controller is; the steps and the
/// variable store live next to it inside the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Current controller state
    pub state: SessionState,

    /// Active step list
    pub active: FlowKind,

    /// Index into the active list
    pub cursor: usize,

    /// Set once the controller reached a terminal outcome
    pub finished: bool,

    /// Set when disconnect handling was requested but has not started yet
    pub disconnect_pending: bool,

    /// Set once the close action was issued to the session layer
    pub closed: bool,

    /// Consecutive retries of the step under the cursor
    pub retries: u32,

    /// Nested cursor path of the step the retries were counted for
    pub retry_position: Vec<usize>,

    /// Number of step invocations (execute and on_event)
    pub steps_executed: usize,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new idle session
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: SessionState::Idle,
            active: FlowKind::Main,
            cursor: 0,
            finished: false,
            disconnect_pending: false,
            closed: false,
            retries: 0,
            retry_position: Vec::new(),
            steps_executed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move from `Idle` to `RunningMain`
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.state != SessionState::Idle {
            return Err(CoreError::InvalidState(format!(
                "Cannot start session in state: {:?}",
                self.state
            )));
        }

        self.active = FlowKind::Main;
        self.cursor = 0;
        self.state = SessionState::RunningMain;
        self.update_timestamp();
        Ok(())
    }

    /// Make `kind` the active list with the cursor at its first step.
    /// Returns the list that was active before.
    pub fn switch_to(&mut self, kind: FlowKind) -> Result<FlowKind, CoreError> {
        if self.finished {
            return Err(CoreError::InvalidState(format!(
                "Cannot switch to {} flow after termination",
                kind
            )));
        }

        let previous = self.active;
        self.active = kind;
        self.cursor = 0;
        self.retries = 0;
        self.state = SessionState::running(kind);
        self.update_timestamp();
        Ok(previous)
    }

    /// Advance the cursor by one and return the new position
    #[inline]
    pub fn advance(&mut self) -> usize {
        self.cursor += 1;
        self.retries = 0;
        self.update_timestamp();
        self.cursor
    }

    /// Count one more retry of the current step
    ///
    /// `position` is the nested cursor path of the step that asked to
    /// retry. A different path means a different nested step, so counting
    /// restarts.
    pub fn record_retry(&mut self, position: Vec<usize>) -> u32 {
        if position != self.retry_position {
            self.retries = 0;
            self.retry_position = position;
        }
        self.retries += 1;
        self.retries
    }

    /// Mark the session as terminated
    pub fn terminate(&mut self) {
        self.finished = true;
        self.disconnect_pending = false;
        self.state = SessionState::Terminated;
        self.update_timestamp();
    }

    /// Whether the controller reached `Terminated`
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Whether the disconnect list is running or about to run
    #[inline]
    pub fn is_disconnecting(&self) -> bool {
        self.active == FlowKind::Disconnect || self.disconnect_pending
    }

    /// Update the timestamp
    #[inline]
    pub fn update_timestamp(&mut self) {
        self.updated_at = Utc::now();
    }
}
