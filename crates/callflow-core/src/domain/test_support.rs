//! Small steps used by the unit tests of this crate

use crate::domain::{
    events::{event_queue, EventQueue, FlowEvent},
    session::SessionId,
    step::{Step, StepContext, StepResult},
    timer::TokioTimerManager,
    variables::VariableStore,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Shared record of step calls
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn record(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Replays a fixed list of results, then continues
pub(crate) struct Scripted {
    name: String,
    script: VecDeque<StepResult>,
    journal: Journal,
}

impl Scripted {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            script: VecDeque::new(),
            journal: journal.clone(),
        }
    }

    pub(crate) fn then(mut self, result: StepResult) -> Self {
        self.script.push_back(result);
        self
    }

    fn next(&mut self) -> StepResult {
        self.script.pop_front().unwrap_or(StepResult::CONTINUE)
    }
}

#[async_trait]
impl Step for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, _ctx: &mut StepContext) -> StepResult {
        self.journal.record(format!("{}.execute", self.name));
        self.next()
    }

    async fn on_event(&mut self, _ctx: &mut StepContext, _event: &FlowEvent) -> StepResult {
        self.journal.record(format!("{}.on_event", self.name));
        self.next()
    }

    async fn cancel(&mut self, _ctx: &mut StepContext) {
        self.journal.record(format!("{}.cancel", self.name));
    }
}

/// A context wired to a fresh queue
pub(crate) fn context() -> (StepContext, EventQueue) {
    let session_id = SessionId("test-session".to_string());
    let (sender, queue) = event_queue(session_id.clone());
    let timers = Arc::new(TokioTimerManager::new(sender.clone()));
    (
        StepContext::new(session_id, VariableStore::new(), timers, sender),
        queue,
    )
}
