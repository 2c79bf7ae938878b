use async_trait::async_trait;
use callflow_core::{
    CoreError, CorrelationToken, EventKind, FlowEvent, Outcome, Step, StepContext, StepResult,
    Variable, VariableStore,
};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

type OperationFn =
    Box<dyn Fn(&VariableStore) -> BoxFuture<'static, Result<Variable, CoreError>> + Send + Sync>;

/// Runs an operation in the background and waits for its result
///
/// The operation starts on its own task and reports back through the event
/// queue. On success the value lands in `<name>.Result` and the flow
/// continues. Failures and timeouts write `<name>.Error` and jump to error
/// handling.
pub struct AsyncOperation {
    name: String,
    operation: OperationFn,
    timeout: Option<Duration>,
    pending: Option<Pending>,
}

struct Pending {
    token: CorrelationToken,
    task: AbortHandle,
}

impl AsyncOperation {
    /// Create the step. `operation` reads what it needs from the variables
    /// and returns an owned future.
    pub fn new<F>(name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(&VariableStore) -> BoxFuture<'static, Result<Variable, CoreError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            operation: Box::new(operation),
            timeout: None,
            pending: None,
        }
    }

    /// Give up after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn settle(&mut self, ctx: &mut StepContext, kind: &EventKind) -> StepResult {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            if let Err(e) = ctx.timers.cancel(&pending.token).await {
                warn!(step = %self.name, error = %e, "Failed to cancel operation timeout");
            }
        }

        match kind {
            EventKind::Completed(value) => {
                debug!(step = %self.name, "Operation completed");
                ctx.variables.set(format!("{}.Result", self.name), value.clone());
                StepResult::CONTINUE
            }
            EventKind::Failed(reason) => {
                ctx.variables
                    .set(format!("{}.Error", self.name), reason.as_str());
                StepResult::fault(CoreError::ExternalDependencyError(format!(
                    "{}: {}",
                    self.name, reason
                )))
            }
            EventKind::Timeout => {
                ctx.variables.set(format!("{}.Error", self.name), "timeout");
                StepResult::fault(CoreError::ExternalDependencyError(format!(
                    "{}: operation timed out",
                    self.name
                )))
            }
            EventKind::ConnectionLost => StepResult::Waiting,
        }
    }
}

#[async_trait]
impl Step for AsyncOperation {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        let token = ctx.new_token();
        let future = (self.operation)(&ctx.variables);
        let events = ctx.events.clone();
        let reply = token.clone();

        let task = tokio::spawn(async move {
            let event = match future.await {
                Ok(value) => FlowEvent::completed(reply, value),
                Err(e) => FlowEvent::failed(reply, e.to_string()),
            };
            events.post(event);
        });

        if let Some(timeout) = self.timeout {
            if let Err(e) = ctx.timers.schedule(timeout, token.clone()).await {
                task.abort();
                return StepResult::fault(e);
            }
        }

        debug!(step = %self.name, token = %token, "Operation started");
        self.pending = Some(Pending {
            token,
            task: task.abort_handle(),
        });
        StepResult::Waiting
    }

    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        let relevant = self
            .pending
            .as_ref()
            .is_some_and(|pending| event.matches(&pending.token));
        if !relevant {
            return StepResult::Waiting;
        }
        self.settle(ctx, &event.kind).await
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            if let Err(e) = ctx.timers.cancel(&pending.token).await {
                warn!(step = %self.name, error = %e, "Failed to cancel operation timeout");
            }
        }
    }
}

impl std::fmt::Debug for AsyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncOperation")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("pending", &self.pending.as_ref().map(|p| &p.token))
            .finish()
    }
}
