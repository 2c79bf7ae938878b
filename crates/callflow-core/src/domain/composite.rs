//! The closed set of step variants a flow list holds
//!
//! A flow list is built from [`FlowStep`] values: plain leaf steps, nested
//! sequences with their own cursor, and conditional branches that pick one
//! nested sequence based on the variable store.

use crate::{
    domain::{
        events::FlowEvent,
        step::{Outcome, Step, StepContext, StepResult},
        variables::VariableStore,
    },
    CoreError,
};
use async_trait::async_trait;
use tracing::{debug, trace};

/// Predicate over the session variables deciding whether a branch runs
pub type Condition = Box<dyn Fn(&VariableStore) -> Result<bool, CoreError> + Send + Sync>;

/// One entry of a flow list
pub enum FlowStep {
    /// A step implemented outside the core
    Leaf(Box<dyn Step>),
    /// Nested list run in order
    Sequence(SequenceContainer),
    /// First matching branch of several nested lists
    Conditional(ConditionalBranch),
}

impl FlowStep {
    /// Wrap a leaf step
    pub fn leaf(step: impl Step + 'static) -> Self {
        FlowStep::Leaf(Box::new(step))
    }

    /// Cursor path to the innermost child that runs next
    ///
    /// Empty for a leaf. Two calls return the same path only while the same
    /// nested child is under the cursor.
    pub fn position(&self) -> Vec<usize> {
        let mut path = Vec::new();
        self.collect_position(&mut path);
        path
    }

    fn collect_position(&self, path: &mut Vec<usize>) {
        match self {
            FlowStep::Leaf(_) => {}
            FlowStep::Sequence(seq) => seq.collect_position(path),
            FlowStep::Conditional(cond) => match cond.active {
                Some(index) => {
                    path.push(index);
                    if let Some(branch) = cond.branches.get(index) {
                        branch.body.collect_position(path);
                    }
                }
                None => path.push(usize::MAX),
            },
        }
    }
}

impl From<SequenceContainer> for FlowStep {
    fn from(sequence: SequenceContainer) -> Self {
        FlowStep::Sequence(sequence)
    }
}

impl From<ConditionalBranch> for FlowStep {
    fn from(branch: ConditionalBranch) -> Self {
        FlowStep::Conditional(branch)
    }
}

impl std::fmt::Debug for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowStep::Leaf(step) => write!(f, "Leaf({})", step.name()),
            FlowStep::Sequence(seq) => write!(f, "Sequence({})", seq.name),
            FlowStep::Conditional(cond) => write!(f, "Conditional({})", cond.name),
        }
    }
}

#[async_trait]
impl Step for FlowStep {
    fn name(&self) -> &str {
        match self {
            FlowStep::Leaf(step) => step.name(),
            FlowStep::Sequence(seq) => seq.name(),
            FlowStep::Conditional(cond) => cond.name(),
        }
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        match self {
            FlowStep::Leaf(step) => step.execute(ctx).await,
            FlowStep::Sequence(seq) => seq.execute(ctx).await,
            FlowStep::Conditional(cond) => cond.execute(ctx).await,
        }
    }

    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        match self {
            FlowStep::Leaf(step) => step.on_event(ctx, event).await,
            FlowStep::Sequence(seq) => seq.on_event(ctx, event).await,
            FlowStep::Conditional(cond) => cond.on_event(ctx, event).await,
        }
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        match self {
            FlowStep::Leaf(step) => step.cancel(ctx).await,
            FlowStep::Sequence(seq) => seq.cancel(ctx).await,
            FlowStep::Conditional(cond) => cond.cancel(ctx).await,
        }
    }
}

/// Nested list of steps with its own cursor
///
/// Reports `Continue` once every child continued. A waiting or retrying
/// child keeps the cursor where it is, so the next call resumes that child.
pub struct SequenceContainer {
    name: String,
    steps: Vec<FlowStep>,
    cursor: usize,
}

impl SequenceContainer {
    /// Create an empty sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            cursor: 0,
        }
    }

    /// Append a child
    pub fn with_step(mut self, step: impl Into<FlowStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Append a leaf child
    pub fn with_leaf(self, step: impl Step + 'static) -> Self {
        self.with_step(FlowStep::leaf(step))
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no children
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of the child that runs next
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn collect_position(&self, path: &mut Vec<usize>) {
        path.push(self.cursor);
        if let Some(step) = self.steps.get(self.cursor) {
            step.collect_position(path);
        }
    }

    /// Run children from the cursor until one suspends or stops the sequence
    async fn drive(&mut self, ctx: &mut StepContext, mut result: StepResult) -> StepResult {
        loop {
            match result {
                StepResult::Waiting | StepResult::Done(Outcome::Retry) => return result,
                StepResult::Done(Outcome::Continue) => {
                    self.cursor += 1;
                }
                StepResult::Done(outcome) => {
                    trace!(sequence = %self.name, ?outcome, "Sequence stopped by child");
                    self.cursor = 0;
                    return result;
                }
            }

            let Some(step) = self.steps.get_mut(self.cursor) else {
                self.cursor = 0;
                return StepResult::CONTINUE;
            };
            trace!(sequence = %self.name, step = step.name(), "Executing nested step");
            result = step.execute(ctx).await;
        }
    }
}

#[async_trait]
impl Step for SequenceContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        let Some(step) = self.steps.get_mut(self.cursor) else {
            self.cursor = 0;
            return StepResult::CONTINUE;
        };
        let result = step.execute(ctx).await;
        self.drive(ctx, result).await
    }

    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        let Some(step) = self.steps.get_mut(self.cursor) else {
            return StepResult::Waiting;
        };
        let result = step.on_event(ctx, event).await;
        self.drive(ctx, result).await
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        if let Some(step) = self.steps.get_mut(self.cursor) {
            step.cancel(ctx).await;
        }
        self.cursor = 0;
    }
}

struct Branch {
    condition: Condition,
    body: SequenceContainer,
}

/// Runs the first branch whose condition holds
pub struct ConditionalBranch {
    name: String,
    branches: Vec<Branch>,
    active: Option<usize>,
}

impl ConditionalBranch {
    /// Create a conditional without branches
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branches: Vec::new(),
            active: None,
        }
    }

    /// Add a branch. Branches are tried in the order they were added.
    pub fn when<F>(mut self, condition: F, body: SequenceContainer) -> Self
    where
        F: Fn(&VariableStore) -> Result<bool, CoreError> + Send + Sync + 'static,
    {
        self.branches.push(Branch {
            condition: Box::new(condition),
            body,
        });
        self
    }

    /// Number of branches
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether there are no branches
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    fn select(&self, variables: &VariableStore) -> Result<Option<usize>, CoreError> {
        for (index, branch) in self.branches.iter().enumerate() {
            if (branch.condition)(variables)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn settle(&mut self, result: StepResult) -> StepResult {
        if !matches!(result, StepResult::Waiting | StepResult::Done(Outcome::Retry)) {
            self.active = None;
        }
        result
    }
}

#[async_trait]
impl Step for ConditionalBranch {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, ctx: &mut StepContext) -> StepResult {
        let index = match self.active {
            Some(index) => index,
            None => match self.select(&ctx.variables) {
                Ok(Some(index)) => index,
                Ok(None) => {
                    debug!(conditional = %self.name, "No branch matched");
                    return StepResult::CONTINUE;
                }
                Err(e) => {
                    return StepResult::fault(CoreError::ConditionEvaluationError(format!(
                        "{}: {}",
                        self.name, e
                    )))
                }
            },
        };

        debug!(conditional = %self.name, branch = index, "Branch selected");
        self.active = Some(index);
        let result = match self.branches.get_mut(index) {
            Some(branch) => branch.body.execute(ctx).await,
            None => StepResult::fault(CoreError::InvalidState(format!(
                "{}: branch {} does not exist",
                self.name, index
            ))),
        };
        self.settle(result)
    }

    async fn on_event(&mut self, ctx: &mut StepContext, event: &FlowEvent) -> StepResult {
        let Some(branch) = self.active.and_then(|i| self.branches.get_mut(i)) else {
            return StepResult::Waiting;
        };
        let result = branch.body.on_event(ctx, event).await;
        self.settle(result)
    }

    async fn cancel(&mut self, ctx: &mut StepContext) {
        if let Some(branch) = self.active.take().and_then(|i| self.branches.get_mut(i)) {
            branch.body.cancel(ctx).await;
        }
    }
}
