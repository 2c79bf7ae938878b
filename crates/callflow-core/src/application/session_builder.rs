use crate::{
    application::{
        flow_controller::FlowController,
        lifecycle::{SessionLifecycle, TracingLifecycle},
    },
    config::FlowConfig,
    domain::{
        events::{event_queue, EventSender, FlowEvent},
        flow_registry::FlowRegistry,
        session::{CorrelationToken, Session, SessionId},
        step::StepContext,
        timer::{TimerService, TokioTimerManager},
        variables::{SessionInfo, VariableStore},
    },
    types::Variable,
};
use std::sync::Arc;
use tracing::debug;

/// Wires a session's queue, timers, variables and lists together
pub struct SessionBuilder {
    registry: FlowRegistry,
    config: FlowConfig,
    info: SessionInfo,
    session_id: Option<SessionId>,
    lifecycle: Arc<dyn SessionLifecycle>,
}

impl SessionBuilder {
    /// Start from the step lists of the session
    pub fn new(registry: FlowRegistry) -> Self {
        Self {
            registry,
            config: FlowConfig::default(),
            info: SessionInfo::default(),
            session_id: None,
            lifecycle: Arc::new(TracingLifecycle),
        }
    }

    /// Use the given configuration
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Facts about the call, written into the variable store
    pub fn with_session_info(mut self, info: SessionInfo) -> Self {
        self.info = info;
        self
    }

    /// Use a fixed id instead of a generated one
    pub fn with_session_id(mut self, id: SessionId) -> Self {
        self.session_id = Some(id);
        self
    }

    /// Collaborator receiving close and switch notifications
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn SessionLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Create the controller and the handle external producers post through
    pub fn build(self) -> (FlowController, SessionHandle) {
        let session_id = self.session_id.unwrap_or_else(SessionId::generate);
        let (sender, queue) = event_queue(session_id.clone());
        let timers: Arc<dyn TimerService> = Arc::new(TokioTimerManager::new(sender.clone()));

        let mut info = self.info;
        if info.audio_folder.is_empty() {
            info.audio_folder = self.config.audio_folder.clone();
        }
        let mut variables = VariableStore::new();
        variables.initialize(&info);

        debug!(session_id = %session_id, "Session built");

        let ctx = StepContext::new(session_id.clone(), variables, timers, sender.clone());
        let controller = FlowController::new(
            Session::new(session_id),
            ctx,
            self.registry,
            queue,
            self.lifecycle,
            self.config,
        );

        (controller, SessionHandle { events: sender })
    }
}

/// Posts events into a running session from outside the controller
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: EventSender,
}

impl SessionHandle {
    /// The session this handle feeds
    pub fn session_id(&self) -> &SessionId {
        self.events.session_id()
    }

    /// Post any event. Returns `false` once the session terminated.
    pub fn post(&self, event: FlowEvent) -> bool {
        self.events.post(event)
    }

    /// Report that the operation behind `token` finished
    pub fn complete(&self, token: CorrelationToken, value: impl Into<Variable>) -> bool {
        self.post(FlowEvent::completed(token, value.into()))
    }

    /// Report that the operation behind `token` failed
    pub fn fail(&self, token: CorrelationToken, reason: impl Into<String>) -> bool {
        self.post(FlowEvent::failed(token, reason))
    }

    /// Report that the underlying connection ended
    pub fn connection_lost(&self) -> bool {
        self.post(FlowEvent::connection_lost())
    }

    /// Whether the session already terminated
    pub fn is_terminated(&self) -> bool {
        self.events.is_closed()
    }
}
