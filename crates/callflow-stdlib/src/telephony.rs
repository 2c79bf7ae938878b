//! Telephony actions the standard steps trigger
//!
//! The executor never talks to a PBX itself; steps reach the call through
//! [`CallControl`], and [`CallControlLifecycle`] turns the controller's close
//! action into a hang-up.

use async_trait::async_trait;
use callflow_core::{CoreError, FlowKind, SessionId, SessionLifecycle};
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::{debug, info};

/// The call a session is attached to
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CallControl: Send + Sync {
    /// Blind-transfer the call to `destination`
    async fn transfer(&self, destination: &str) -> Result<(), CoreError>;

    /// Hang up
    async fn disconnect(&self) -> Result<(), CoreError>;
}

/// Call control that only writes traces
#[derive(Debug, Default, Clone)]
pub struct LoggingCallControl;

#[async_trait]
impl CallControl for LoggingCallControl {
    async fn transfer(&self, destination: &str) -> Result<(), CoreError> {
        info!(destination, "Transferring call");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), CoreError> {
        info!("Disconnecting call");
        Ok(())
    }
}

/// Session lifecycle that hangs up the call when the session closes
pub struct CallControlLifecycle {
    call: Arc<dyn CallControl>,
}

impl CallControlLifecycle {
    /// Wrap a call
    pub fn new(call: Arc<dyn CallControl>) -> Self {
        Self { call }
    }
}

#[async_trait]
impl SessionLifecycle for CallControlLifecycle {
    async fn close_session(&self, session_id: &SessionId) -> Result<(), CoreError> {
        debug!(session_id = %session_id, "Closing session, disconnecting call");
        self.call.disconnect().await
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
