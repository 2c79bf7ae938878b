// Module definitions for the standard step categories

pub mod async_operation;
pub mod code;
pub mod flow_control;
pub mod set_variable;
pub mod transfer;

// Re-export common steps
pub use async_operation::*;
pub use code::*;
pub use flow_control::*;
pub use set_variable::*;
pub use transfer::*;

#[cfg(test)]
pub(crate) fn test_context() -> (callflow_core::StepContext, callflow_core::EventQueue) {
    use callflow_core::{event_queue, SessionId, StepContext, TokioTimerManager, VariableStore};
    use std::sync::Arc;

    let session_id = SessionId("stdlib-test".to_string());
    let (sender, queue) = event_queue(session_id.clone());
    let timers = Arc::new(TokioTimerManager::new(sender.clone()));
    (
        StepContext::new(session_id, VariableStore::new(), timers, sender),
        queue,
    )
}
