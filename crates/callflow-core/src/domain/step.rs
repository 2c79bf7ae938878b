use crate::{
    domain::{
        events::{EventSender, FlowEvent},
        session::{CorrelationToken, SessionId},
        timer::TimerService,
        variables::VariableStore,
    },
    CoreError,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// Classification a step reports to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Advance to the next step
    Continue,
    /// Run the same step again
    Retry,
    /// Hand control to the error list
    JumpToError,
    /// Stop the session
    Terminate,
}

/// What a step call produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The step finished with an outcome
    Done(Outcome),
    /// The step registered interest in a future event and must not be advanced
    Waiting,
}

impl StepResult {
    /// Shorthand for `Done(Outcome::Continue)`
    pub const CONTINUE: StepResult = StepResult::Done(Outcome::Continue);

    /// Translate a step-local fault into `jump-to-error`
    pub fn fault(err: CoreError) -> Self {
        error!(error = %err, "Step fault, jumping to error handling");
        StepResult::Done(Outcome::JumpToError)
    }

    /// Whether the step is suspended
    #[inline]
    pub fn is_waiting(&self) -> bool {
        matches!(self, StepResult::Waiting)
    }
}

impl From<Outcome> for StepResult {
    fn from(outcome: Outcome) -> Self {
        StepResult::Done(outcome)
    }
}

impl From<Result<StepResult, CoreError>> for StepResult {
    fn from(result: Result<StepResult, CoreError>) -> Self {
        result.unwrap_or_else(StepResult::fault)
    }
}

/// Everything a step may touch while it runs
///
/// The context is owned by the controller and lent to exactly one step call
/// at a time.
pub struct StepContext {
    /// The session the step runs in
    pub session_id: SessionId,

    /// Per-session variables
    pub variables: VariableStore,

    /// Timer service posting into this session's queue
    pub timers: Arc<dyn TimerService>,

    /// Producer handle for this session's queue
    pub events: EventSender,
}

impl StepContext {
    /// Create a context
    pub fn new(
        session_id: SessionId,
        variables: VariableStore,
        timers: Arc<dyn TimerService>,
        events: EventSender,
    ) -> Self {
        Self {
            session_id,
            variables,
            timers,
            events,
        }
    }

    /// A fresh token for a wait the step is about to register
    pub fn new_token(&self) -> CorrelationToken {
        CorrelationToken::generate()
    }
}

/// Uniform contract every flow component implements
///
/// Implementations must not let faults escape: report them as
/// `Outcome::JumpToError`, typically through [`StepResult::fault`].
#[async_trait]
pub trait Step: Send + Sync {
    /// Display name used in traces
    fn name(&self) -> &str;

    /// Run when the step becomes active
    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult;

    /// Run for every event delivered while the step is waiting.
    /// Events that do not belong to this step must yield `Waiting`.
    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult;

    /// Called when the controller abandons the step while it is waiting
    async fn cancel(&mut self, _ctx: &mut StepContext) {}
}
