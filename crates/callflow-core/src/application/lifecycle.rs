use crate::{
    domain::session::{FlowKind, SessionId},
    CoreError,
};
use async_trait::async_trait;
use tracing::{debug, info};

/// Notifications the controller sends to the surrounding session layer
#[async_trait]
pub trait SessionLifecycle: Send + Sync {
    /// End the session on the telephony side. Issued at most once per session.
    async fn close_session(&self, session_id: &SessionId) -> Result<(), CoreError>;

    /// The controller moved from one step list to another
    async fn notify_flow_switched(
        &self,
        session_id: &SessionId,
        from: FlowKind,
        to: FlowKind,
    ) -> Result<(), CoreError>;
}

/// Lifecycle that only writes traces
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLifecycle;

#[async_trait]
impl SessionLifecycle for TracingLifecycle {
    async fn close_session(&self, session_id: &SessionId) -> Result<(), CoreError> {
        info!(session_id = %session_id, "Session closed");
        Ok(())
    }

    async fn notify_flow_switched(
        &self,
        session_id: &SessionId,
        from: FlowKind,
        to: FlowKind,
    ) -> Result<(), CoreError> {
        debug!(session_id = %session_id, %from, %to, "Flow switched");
        Ok(())
    }
}
