use crate::domain::{composite::FlowStep, session::FlowKind, step::Step};

/// Ordered steps of one role
///
/// The structure is fixed once the list is built; only the steps' own
/// internal state changes while the controller runs them.
#[derive(Debug)]
pub struct FlowList {
    kind: FlowKind,
    steps: Vec<FlowStep>,
}

impl FlowList {
    /// Create a list from its steps
    pub fn new(kind: FlowKind, steps: Vec<FlowStep>) -> Self {
        Self { kind, steps }
    }

    /// Role of this list
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Number of top-level steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the list has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`
    pub fn get(&self, index: usize) -> Option<&FlowStep> {
        self.steps.get(index)
    }

    /// Step at `index`, mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut FlowStep> {
        self.steps.get_mut(index)
    }

    /// Display names in order
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

/// The three step lists of a session
#[derive(Debug)]
pub struct FlowRegistry {
    main: FlowList,
    error: FlowList,
    disconnect: FlowList,
}

impl FlowRegistry {
    /// Create a registry from prepared lists
    pub fn new(main: Vec<FlowStep>, error: Vec<FlowStep>, disconnect: Vec<FlowStep>) -> Self {
        Self {
            main: FlowList::new(FlowKind::Main, main),
            error: FlowList::new(FlowKind::Error, error),
            disconnect: FlowList::new(FlowKind::Disconnect, disconnect),
        }
    }

    /// Start an empty registry builder
    pub fn builder() -> FlowRegistryBuilder {
        FlowRegistryBuilder::default()
    }

    /// The list for `kind`
    pub fn list(&self, kind: FlowKind) -> &FlowList {
        match kind {
            FlowKind::Main => &self.main,
            FlowKind::Error => &self.error,
            FlowKind::Disconnect => &self.disconnect,
        }
    }

    /// Mutable access to the list for `kind`
    pub fn list_mut(&mut self, kind: FlowKind) -> &mut FlowList {
        match kind {
            FlowKind::Main => &mut self.main,
            FlowKind::Error => &mut self.error,
            FlowKind::Disconnect => &mut self.disconnect,
        }
    }
}

/// Collects steps for each list before the session starts
#[derive(Default)]
pub struct FlowRegistryBuilder {
    main: Vec<FlowStep>,
    error: Vec<FlowStep>,
    disconnect: Vec<FlowStep>,
}

impl FlowRegistryBuilder {
    /// Append to the main list
    pub fn main(mut self, step: impl Into<FlowStep>) -> Self {
        self.main.push(step.into());
        self
    }

    /// Append to the error list
    pub fn error(mut self, step: impl Into<FlowStep>) -> Self {
        self.error.push(step.into());
        self
    }

    /// Append to the disconnect list
    pub fn disconnect(mut self, step: impl Into<FlowStep>) -> Self {
        self.disconnect.push(step.into());
        self
    }

    /// Append a leaf step to the list for `kind`
    pub fn leaf(self, kind: FlowKind, step: impl Step + 'static) -> Self {
        let step = FlowStep::leaf(step);
        match kind {
            FlowKind::Main => self.main(step),
            FlowKind::Error => self.error(step),
            FlowKind::Disconnect => self.disconnect(step),
        }
    }

    /// Freeze the lists
    pub fn build(self) -> FlowRegistry {
        FlowRegistry::new(self.main, self.error, self.disconnect)
    }
}
