/// Session identity and controller state
pub mod session;

/// Asynchronous events and the per-session queue
pub mod events;

/// One-shot timers
pub mod timer;

/// Session variable store
pub mod variables;

/// Step contract
pub mod step;

/// Step variants: leaf, sequence and conditional
pub mod composite;

/// Main, error and disconnect step lists
pub mod flow_registry;

#[cfg(test)]
pub(crate) mod test_support;
