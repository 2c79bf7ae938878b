use crate::telephony::CallControl;
use async_trait::async_trait;
use callflow_core::{
    CoreError, CorrelationToken, FlowEvent, Outcome, Step, StepContext, StepResult,
    VariableStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

type DestinationFn = Box<dyn Fn(&VariableStore) -> Result<String, CoreError> + Send + Sync>;

/// Transfers the call, optionally after a delay
///
/// A successful transfer hands the call away, so the step reports
/// `Terminate`. The resolved destination is stored under `<name>.Destination`.
pub struct Transfer {
    name: String,
    call: Arc<dyn CallControl>,
    destination: DestinationFn,
    delay: Duration,
    token: Option<CorrelationToken>,
}

impl Transfer {
    /// Transfer to a destination computed from the variables when the transfer happens
    pub fn new<F>(name: impl Into<String>, call: Arc<dyn CallControl>, destination: F) -> Self
    where
        F: Fn(&VariableStore) -> Result<String, CoreError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            call,
            destination: Box::new(destination),
            delay: Duration::ZERO,
            token: None,
        }
    }

    /// Transfer to a fixed extension
    pub fn to(name: impl Into<String>, call: Arc<dyn CallControl>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self::new(name, call, move |_| Ok(extension.clone()))
    }

    /// Wait this long before transferring
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn transfer(&mut self, ctx: &mut StepContext) -> StepResult {
        let destination = match (self.destination)(&ctx.variables) {
            Ok(destination) => destination,
            Err(e) => return StepResult::fault(e),
        };

        info!(step = %self.name, destination = %destination, "Transferring");
        ctx.variables
            .set(format!("{}.Destination", self.name), destination.as_str());

        match self.call.transfer(&destination).await {
            Ok(()) => StepResult::Done(Outcome::Terminate),
            Err(e) => StepResult::fault(CoreError::ExternalDependencyError(format!(
                "{}: transfer to {} failed: {}",
                self.name, destination, e
            ))),
        }
    }
}

#[async_trait]
impl Step for Transfer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        if self.delay.is_zero() {
            return self.transfer(ctx).await;
        }

        let token = ctx.new_token();
        if let Err(e) = ctx.timers.schedule(self.delay, token.clone()).await {
            return StepResult::fault(e);
        }
        self.token = Some(token);
        StepResult::Waiting
    }

    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        match &self.token {
            Some(token) if event.is_timeout_for(token) => {
                self.token = None;
                self.transfer(ctx).await
            }
            _ => StepResult::Waiting,
        }
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        if let Some(token) = self.token.take() {
            if let Err(e) = ctx.timers.cancel(&token).await {
                warn!(step = %self.name, error = %e, "Failed to cancel transfer delay");
            }
        }
    }
}
