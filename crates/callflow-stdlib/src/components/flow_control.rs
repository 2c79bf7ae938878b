use async_trait::async_trait;
use callflow_core::{
    CorrelationToken, FlowEvent, Outcome, Step, StepContext, StepResult,
};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Pauses the flow for a fixed time
#[derive(Debug)]
pub struct Wait {
    name: String,
    duration: Duration,
    token: Option<CorrelationToken>,
}

impl Wait {
    /// Create the step
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            token: None,
        }
    }
}

#[async_trait]
impl Step for Wait {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        let token = ctx.new_token();
        if let Err(e) = ctx.timers.schedule(self.duration, token.clone()).await {
            return StepResult::fault(e);
        }
        trace!(step = %self.name, duration = ?self.duration, "Waiting");
        self.token = Some(token);
        StepResult::Waiting
    }

    async fn on_event(&mut self, _ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        match &self.token {
            Some(token) if event.is_timeout_for(token) => {
                self.token = None;
                StepResult::CONTINUE
            }
            _ => StepResult::Waiting,
        }
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        if let Some(token) = self.token.take() {
            if let Err(e) = ctx.timers.cancel(&token).await {
                warn!(step = %self.name, error = %e, "Failed to cancel wait timer");
            }
        }
    }
}

/// Ends the session
#[derive(Debug)]
pub struct DisconnectCall {
    name: String,
}

impl DisconnectCall {
    /// Create the step
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Step for DisconnectCall {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, _ctx: &mut StepContext) -> StepResult {
        debug!(step = %self.name, "Disconnect requested");
        StepResult::Done(Outcome::Terminate)
    }

    async fn on_event(&mut self, _ctx: &mut StepContext, _event: &FlowEvent) -> StepResult {
        StepResult::Waiting
    }
}
