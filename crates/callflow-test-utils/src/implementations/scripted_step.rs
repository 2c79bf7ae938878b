//! Step fake driven by a script of outcomes and timer waits.

use async_trait::async_trait;
use callflow_core::{CorrelationToken, FlowEvent, Outcome, Step, StepContext, StepResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct JournalState {
    entries: Vec<String>,
    active: usize,
    max_active: usize,
}

/// Shared log of step invocations.
///
/// Besides the call order it tracks how many step calls were in flight at
/// once, so tests can check that a session never runs two steps together.
#[derive(Debug, Clone, Default)]
pub struct StepJournal {
    state: Arc<Mutex<JournalState>>,
}

impl StepJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations recorded so far, formatted as `step.call`
    pub fn entries(&self) -> Vec<String> {
        self.state.lock().entries.clone()
    }

    /// Highest number of step calls observed in flight at the same time
    pub fn max_concurrent(&self) -> usize {
        self.state.lock().max_active
    }

    /// Number of recorded calls of `call` on `step`
    pub fn count(&self, step: &str, call: &str) -> usize {
        let entry = format!("{}.{}", step, call);
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| **e == entry)
            .count()
    }

    fn enter(&self, entry: String) -> ActiveCall {
        let mut state = self.state.lock();
        state.entries.push(entry);
        state.active += 1;
        state.max_active = state.max_active.max(state.active);
        ActiveCall {
            journal: self.clone(),
        }
    }
}

struct ActiveCall {
    journal: StepJournal,
}

impl Drop for ActiveCall {
    fn drop(&mut self) {
        self.journal.state.lock().active -= 1;
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Finish(Outcome),
    WaitForTimer(Duration),
}

/// A step whose behaviour is fixed in advance.
///
/// Each `execute` or matching timer event consumes the next scripted action.
/// Once the script is exhausted the step continues.
pub struct ScriptedStep {
    name: String,
    journal: StepJournal,
    script: VecDeque<Action>,
    pending: Option<CorrelationToken>,
    yield_during_call: bool,
}

impl ScriptedStep {
    /// Create a step that records into `journal`
    pub fn new(name: impl Into<String>, journal: &StepJournal) -> Self {
        Self {
            name: name.into(),
            journal: journal.clone(),
            script: VecDeque::new(),
            pending: None,
            yield_during_call: false,
        }
    }

    /// Report `outcome` on the next call
    pub fn then(mut self, outcome: Outcome) -> Self {
        self.script.push_back(Action::Finish(outcome));
        self
    }

    /// Arm a timer on the next call and wait for it
    pub fn then_wait_for_timer(mut self, duration: Duration) -> Self {
        self.script.push_back(Action::WaitForTimer(duration));
        self
    }

    /// Yield to the runtime inside every call, giving other tasks a chance
    /// to interleave with the step
    pub fn yielding(mut self) -> Self {
        self.yield_during_call = true;
        self
    }

    async fn next_action(&mut self, ctx: &mut StepContext) -> StepResult {
        if self.yield_during_call {
            tokio::task::yield_now().await;
        }

        match self.script.pop_front() {
            Some(Action::Finish(outcome)) => StepResult::Done(outcome),
            Some(Action::WaitForTimer(duration)) => {
                let token = ctx.new_token();
                match ctx.timers.schedule(duration, token.clone()).await {
                    Ok(()) => {
                        self.pending = Some(token);
                        StepResult::Waiting
                    }
                    Err(e) => StepResult::fault(e),
                }
            }
            None => StepResult::CONTINUE,
        }
    }
}

#[async_trait]
impl Step for ScriptedStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        let _call = self.journal.enter(format!("{}.execute", self.name));
        self.next_action(ctx).await
    }

    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        let _call = self.journal.enter(format!("{}.on_event", self.name));
        match &self.pending {
            Some(token) if event.is_timeout_for(token) => {
                self.pending = None;
                self.next_action(ctx).await
            }
            _ => StepResult::Waiting,
        }
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        let _call = self.journal.enter(format!("{}.cancel", self.name));
        if let Some(token) = self.pending.take() {
            let _ = ctx.timers.cancel(&token).await;
        }
    }
}
