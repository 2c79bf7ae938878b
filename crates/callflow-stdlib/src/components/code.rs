use async_trait::async_trait;
use callflow_core::{
    CoreError, FlowEvent, Step, StepContext, StepResult, Variable, VariableStore,
};
use tracing::debug;

/// Closure run by [`ExecuteCode`]
pub type CodeFn = Box<dyn Fn(&mut VariableStore) -> Result<Variable, CoreError> + Send + Sync>;

/// Runs custom code against the variable store
///
/// The returned value is stored under `<name>.ReturnValue`. An error from the
/// code is a step fault.
pub struct ExecuteCode {
    name: String,
    code: CodeFn,
}

impl ExecuteCode {
    /// Create the step
    pub fn new<F>(name: impl Into<String>, code: F) -> Self
    where
        F: Fn(&mut VariableStore) -> Result<Variable, CoreError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            code: Box::new(code),
        }
    }

    /// Variable key the return value is written to
    pub fn return_value_key(&self) -> String {
        format!("{}.ReturnValue", self.name)
    }
}

#[async_trait]
impl Step for ExecuteCode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        match (self.code)(&mut ctx.variables) {
            Ok(value) => {
                debug!(step = %self.name, value = %value.as_value(), "Code executed");
                ctx.variables.set(self.return_value_key(), value);
                StepResult::CONTINUE
            }
            Err(e) => StepResult::fault(CoreError::StepExecutionError(format!(
                "{}: {}",
                self.name, e
            ))),
        }
    }

    async fn on_event(&mut self, _ctx: &mut StepContext, _event: &FlowEvent) -> StepResult {
        StepResult::Waiting
    }
}
