//! Shared fixtures for the callflow scenario suites.

use callflow_core::{FlowConfig, FlowController, FlowRegistry, SessionBuilder, SessionHandle};
use callflow_test_utils::{init_test_tracing, RecordingLifecycle, ScriptedStep, StepJournal};
use std::sync::Arc;

/// One session under test together with the fakes observing it
pub struct Scenario {
    /// Log of every step call
    pub journal: StepJournal,

    /// Records close and switch notifications
    pub lifecycle: Arc<RecordingLifecycle>,

    config: FlowConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Fresh fakes and the default configuration
    pub fn new() -> Self {
        init_test_tracing();
        Self {
            journal: StepJournal::new(),
            lifecycle: RecordingLifecycle::new(),
            config: FlowConfig::default(),
        }
    }

    /// Use `config` for the session
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// A scripted step writing into this scenario's journal
    pub fn step(&self, name: &str) -> ScriptedStep {
        ScriptedStep::new(name, &self.journal)
    }

    /// Build the session for `registry`
    pub fn start(&self, registry: FlowRegistry) -> (FlowController, SessionHandle) {
        SessionBuilder::new(registry)
            .with_config(self.config.clone())
            .with_lifecycle(self.lifecycle.clone())
            .build()
    }

    /// Step calls recorded so far
    pub fn calls(&self) -> Vec<String> {
        self.journal.entries()
    }
}
