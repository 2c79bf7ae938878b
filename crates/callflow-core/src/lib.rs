//!
//! Callflow Core - Sequential, event-driven flow executor
//!
//! This crate runs the main, error and disconnect step lists of a call
//! session one step at a time, buffering asynchronous events until the
//! active step is ready for them. Concrete steps live in `callflow-stdlib`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - sessions, events, timers, steps and flow lists
pub mod domain;

/// Application services - the controller and its wiring
pub mod application;

/// Project configuration
pub mod config;

/// Core types
pub mod types;

/// Error types
pub mod error;

// Re-export key types
pub use config::FlowConfig;
pub use error::CoreError;
pub use types::Variable;

pub use application::flow_controller::{FlowController, SessionSummary};
pub use application::lifecycle::{SessionLifecycle, TracingLifecycle};
pub use application::session_builder::{SessionBuilder, SessionHandle};

pub use domain::composite::{Condition, ConditionalBranch, FlowStep, SequenceContainer};
pub use domain::events::{event_queue, EventKind, EventQueue, EventSender, FlowEvent};
pub use domain::flow_registry::{FlowList, FlowRegistry, FlowRegistryBuilder};
pub use domain::session::{CorrelationToken, FlowKind, Session, SessionId, SessionState};
pub use domain::step::{Outcome, Step, StepContext, StepResult};
pub use domain::timer::{duration_from_millis, TimerService, TokioTimerManager};
pub use domain::variables::{SessionInfo, VariableStore};
