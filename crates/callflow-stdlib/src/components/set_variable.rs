use async_trait::async_trait;
use callflow_core::{
    CoreError, FlowEvent, Step, StepContext, StepResult, Variable, VariableStore,
};

type ValueFn = Box<dyn Fn(&VariableStore) -> Result<Variable, CoreError> + Send + Sync>;

/// Writes one variable, computed from the current store
pub struct SetVariable {
    name: String,
    key: String,
    value: ValueFn,
}

impl SetVariable {
    /// Compute the value with `value` every time the step runs
    pub fn new<F>(name: impl Into<String>, key: impl Into<String>, value: F) -> Self
    where
        F: Fn(&VariableStore) -> Result<Variable, CoreError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            key: key.into(),
            value: Box::new(value),
        }
    }

    /// Always write the same value
    pub fn constant(
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Variable>,
    ) -> Self {
        let value = value.into();
        Self::new(name, key, move |_| Ok(value.clone()))
    }
}

#[async_trait]
impl Step for SetVariable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        match (self.value)(&ctx.variables) {
            Ok(value) => {
                ctx.variables.set(self.key.clone(), value);
                StepResult::CONTINUE
            }
            Err(e) => StepResult::fault(e),
        }
    }

    async fn on_event(&mut self, _ctx: &mut StepContext, _event: &FlowEvent) -> StepResult {
        StepResult::Waiting
    }
}
