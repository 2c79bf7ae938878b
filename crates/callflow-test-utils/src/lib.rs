//! Testing utilities for callflow sessions.
//!
//! This crate provides mocks, test implementations (fakes), assertion
//! utilities and tracing setup shared by the callflow test suites.

pub mod assertions;
pub mod error;
pub mod implementations;
pub mod mocks;
pub mod util;

/// Re-export commonly used types for convenience
pub use mockall;

pub use error::TestError;
pub use implementations::{
    LifecycleCall, RecordingCallControl, RecordingLifecycle, ScriptedStep, StepJournal,
};
pub use util::{init_test_tracing, run_with_timeout};
