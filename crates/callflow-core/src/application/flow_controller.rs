//! The flow controller: a single cooperative loop per session
//!
//! The controller owns the three step lists, the step context and the
//! consumer side of the event queue. It runs one step at a time, suspends on
//! the queue while that step waits, and routes outcomes between the main,
//! error and disconnect lists.

use crate::{
    application::lifecycle::SessionLifecycle,
    config::FlowConfig,
    domain::{
        composite::FlowStep,
        events::{EventKind, EventQueue, FlowEvent},
        flow_registry::FlowRegistry,
        session::{FlowKind, Session, SessionId, SessionState},
        step::{Outcome, Step, StepContext, StepResult},
        variables::VariableStore,
    },
    CoreError,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, trace, warn, Instrument};

/// What a finished session looked like
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: SessionId,

    /// Final controller state
    pub state: SessionState,

    /// The list that was active when the session ended
    pub last_flow: FlowKind,

    /// Number of step invocations
    pub steps_executed: usize,

    /// Whether the close action was issued
    pub closed: bool,
}

/// Executor for one session
pub struct FlowController {
    session: Session,
    ctx: StepContext,
    registry: FlowRegistry,
    queue: EventQueue,
    lifecycle: Arc<dyn SessionLifecycle>,
    config: FlowConfig,
}

impl FlowController {
    pub(crate) fn new(
        session: Session,
        ctx: StepContext,
        registry: FlowRegistry,
        queue: EventQueue,
        lifecycle: Arc<dyn SessionLifecycle>,
        config: FlowConfig,
    ) -> Self {
        Self {
            session,
            ctx,
            registry,
            queue,
            lifecycle,
            config,
        }
    }

    /// Session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session variables
    pub fn variables(&self) -> &VariableStore {
        &self.ctx.variables
    }

    /// Run the session to completion
    ///
    /// Returns an error only when the controller itself cannot continue
    /// (for example, its event queue was closed underneath it). Step faults
    /// are routed through the error list and never surface here.
    pub async fn run(mut self) -> Result<SessionSummary, CoreError> {
        let span = info_span!(
            "session",
            project = %self.config.project_name,
            session_id = %self.session.id
        );

        async move {
            let result = self.drive().await;
            if let Err(e) = &result {
                error!(error = %e, "Controller stopped");
                if !self.session.is_terminated() {
                    self.finish().await;
                }
            }
            result.map(|()| self.summary())
        }
        .instrument(span)
        .await
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session.id.clone(),
            state: self.session.state,
            last_flow: self.session.active,
            steps_executed: self.session.steps_executed,
            closed: self.session.closed,
        }
    }

    async fn drive(&mut self) -> Result<(), CoreError> {
        self.session.start()?;
        info!(
            main = self.registry.list(FlowKind::Main).len(),
            error = self.registry.list(FlowKind::Error).len(),
            disconnect = self.registry.list(FlowKind::Disconnect).len(),
            "Callflow started"
        );

        self.settle_position().await?;
        while !self.session.is_terminated() {
            let result = self.execute_current().await;
            self.settle(result).await?;
        }
        Ok(())
    }

    async fn execute_current(&mut self) -> StepResult {
        let kind = self.session.active;
        let cursor = self.session.cursor;
        self.session.steps_executed += 1;

        match self.registry.list_mut(kind).get_mut(cursor) {
            Some(step) => {
                debug!(flow = %kind, cursor, step = step.name(), "Executing step");
                step.execute(&mut self.ctx).await
            }
            None => StepResult::fault(CoreError::InvalidState(format!(
                "No step at {} position {}",
                kind, cursor
            ))),
        }
    }

    async fn deliver(&mut self, event: &FlowEvent) -> StepResult {
        let kind = self.session.active;
        let cursor = self.session.cursor;
        self.session.steps_executed += 1;

        match self.registry.list_mut(kind).get_mut(cursor) {
            Some(step) => {
                trace!(flow = %kind, step = step.name(), kind = ?event.kind, "Delivering event");
                step.on_event(&mut self.ctx, event).await
            }
            None => StepResult::fault(CoreError::InvalidState(format!(
                "No waiting step at {} position {}",
                kind, cursor
            ))),
        }
    }

    /// Consume events until the active step reports an outcome, then apply it
    async fn settle(&mut self, mut result: StepResult) -> Result<(), CoreError> {
        loop {
            match result {
                StepResult::Done(outcome) => return self.apply(outcome).await,
                StepResult::Waiting => {
                    let Some(event) = self.queue.take().await else {
                        return Err(CoreError::EventQueueClosed(self.session.id.to_string()));
                    };

                    if event.kind == EventKind::ConnectionLost {
                        if self.session.is_disconnecting() {
                            debug!("Connection lost during disconnect handling, ignoring");
                            continue;
                        }
                        return self.connection_lost().await;
                    }

                    result = self.deliver(&event).await;
                }
            }
        }
    }

    async fn apply(&mut self, outcome: Outcome) -> Result<(), CoreError> {
        trace!(flow = %self.session.active, cursor = self.session.cursor, ?outcome, "Step outcome");
        match outcome {
            Outcome::Continue => {
                self.session.advance();
                self.settle_position().await
            }
            Outcome::Retry => {
                let position = self
                    .registry
                    .list(self.session.active)
                    .get(self.session.cursor)
                    .map(FlowStep::position)
                    .unwrap_or_default();
                let retries = self.session.record_retry(position);
                match self.config.max_step_retries {
                    Some(max) if retries > max => {
                        warn!(retries, max, "Step exceeded its retry limit");
                        self.jump_to_error().await
                    }
                    _ => Ok(()),
                }
            }
            Outcome::JumpToError => self.jump_to_error().await,
            Outcome::Terminate => self.terminate().await,
        }
    }

    /// Handle flow-complete until the cursor points at a runnable step or the session ended
    async fn settle_position(&mut self) -> Result<(), CoreError> {
        while !self.session.is_terminated()
            && self.session.cursor >= self.registry.list(self.session.active).len()
        {
            match self.session.active {
                FlowKind::Main | FlowKind::Error => {
                    trace!(flow = %self.session.active, "Flow complete");
                    self.close().await;
                    self.enter_disconnect().await?;
                }
                FlowKind::Disconnect => {
                    trace!("Callflow finished...");
                    self.finish().await;
                }
            }
        }
        Ok(())
    }

    async fn jump_to_error(&mut self) -> Result<(), CoreError> {
        match self.session.active {
            FlowKind::Error => {
                warn!("Error during error handler flow, exiting callflow");
                self.close().await;
                self.finish().await;
                Ok(())
            }
            FlowKind::Disconnect => {
                warn!("Error during disconnect handler flow, exiting callflow");
                self.finish().await;
                Ok(())
            }
            FlowKind::Main => {
                if self.registry.list(FlowKind::Error).is_empty() {
                    debug!("Error handler flow is empty");
                    self.close().await;
                    self.enter_disconnect().await
                } else {
                    info!("Start executing error handler flow");
                    self.switch(FlowKind::Error).await
                }
            }
        }
    }

    async fn terminate(&mut self) -> Result<(), CoreError> {
        match self.session.active {
            FlowKind::Main => {
                self.close().await;
                self.enter_disconnect().await
            }
            FlowKind::Error => {
                self.close().await;
                self.finish().await;
                Ok(())
            }
            FlowKind::Disconnect => {
                trace!("Callflow finished...");
                self.finish().await;
                Ok(())
            }
        }
    }

    async fn connection_lost(&mut self) -> Result<(), CoreError> {
        info!(flow = %self.session.active, "Connection lost");

        let kind = self.session.active;
        let cursor = self.session.cursor;
        if let Some(step) = self.registry.list_mut(kind).get_mut(cursor) {
            step.cancel(&mut self.ctx).await;
        }

        self.session.disconnect_pending = true;
        self.close().await;
        self.enter_disconnect().await
    }

    /// Start the disconnect list. Re-entry while it runs is ignored.
    async fn enter_disconnect(&mut self) -> Result<(), CoreError> {
        if self.session.is_terminated() || self.session.active == FlowKind::Disconnect {
            debug!("Disconnect handling already in progress");
            return Ok(());
        }

        self.session.disconnect_pending = false;
        self.switch(FlowKind::Disconnect).await?;

        if self.registry.list(FlowKind::Disconnect).is_empty() {
            trace!("Disconnect handler flow is empty");
            self.finish().await;
        } else {
            info!("Start executing disconnect handler flow");
        }
        Ok(())
    }

    async fn switch(&mut self, to: FlowKind) -> Result<(), CoreError> {
        let from = self.session.switch_to(to)?;
        if let Err(e) = self
            .lifecycle
            .notify_flow_switched(&self.session.id, from, to)
            .await
        {
            warn!(error = %e, %from, %to, "Flow switch notification failed");
        }
        Ok(())
    }

    /// Issue the close action once per session
    async fn close(&mut self) {
        if self.session.closed {
            return;
        }
        self.session.closed = true;
        info!("Callflow finished, disconnecting call");
        if let Err(e) = self.lifecycle.close_session(&self.session.id).await {
            warn!(error = %e, "Close session failed");
        }
    }

    async fn finish(&mut self) {
        match self.ctx.timers.cancel_all().await {
            Ok(0) => {}
            Ok(n) => debug!(cancelled = n, "Cancelled outstanding timers"),
            Err(e) => warn!(error = %e, "Failed to cancel timers"),
        }
        self.queue.close();
        self.session.terminate();
        info!(
            steps = self.session.steps_executed,
            closed = self.session.closed,
            "Session terminated"
        );
    }
}
