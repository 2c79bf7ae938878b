//! Session lifecycle fake that records every notification.

use async_trait::async_trait;
use callflow_core::{CoreError, FlowKind, SessionHandle, SessionId, SessionLifecycle};
use parking_lot::Mutex;
use std::sync::Arc;

/// A notification the controller sent to the session layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleCall {
    /// `close_session` was invoked
    Close(SessionId),
    /// `notify_flow_switched` was invoked
    Switched {
        /// The list that was active before
        from: FlowKind,
        /// The list that became active
        to: FlowKind,
    },
}

/// In-memory lifecycle that remembers what it was told.
///
/// When an echo handle is attached, closing the session also posts a
/// connection-lost event into it, the way a real call reports its own
/// hang-up back to the flow.
#[derive(Default)]
pub struct RecordingLifecycle {
    calls: Mutex<Vec<LifecycleCall>>,
    echo: Mutex<Option<SessionHandle>>,
}

impl RecordingLifecycle {
    /// Create an empty recorder
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Post connection-lost into `handle` whenever the session is closed
    pub fn echo_connection_lost(&self, handle: SessionHandle) {
        *self.echo.lock() = Some(handle);
    }

    /// Everything recorded so far, in call order
    pub fn calls(&self) -> Vec<LifecycleCall> {
        self.calls.lock().clone()
    }

    /// How many times `close_session` was invoked
    pub fn close_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, LifecycleCall::Close(_)))
            .count()
    }

    /// The lists the session moved through, starting with main
    pub fn flow_path(&self) -> Vec<FlowKind> {
        let mut path = vec![FlowKind::Main];
        for call in self.calls.lock().iter() {
            if let LifecycleCall::Switched { to, .. } = call {
                path.push(*to);
            }
        }
        path
    }
}

#[async_trait]
impl SessionLifecycle for RecordingLifecycle {
    async fn close_session(&self, session_id: &SessionId) -> Result<(), CoreError> {
        self.calls.lock().push(LifecycleCall::Close(session_id.clone()));

        let echo = self.echo.lock().clone();
        if let Some(handle) = echo {
            handle.connection_lost();
        }
        Ok(())
    }

    async fn notify_flow_switched(
        &self,
        _session_id: &SessionId,
        from: FlowKind,
        to: FlowKind,
    ) -> Result<(), CoreError> {
        self.calls.lock().push(LifecycleCall::Switched { from, to });
        Ok(())
    }
}
