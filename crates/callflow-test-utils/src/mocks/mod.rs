//! Mock implementations of the callflow collaborator interfaces.
//!
//! These mocks let a test state exact expectations on how the controller
//! talks to the session layer and to the call.

pub mod call_control;
pub mod lifecycle;

// Re-export all mocks and their creator functions for easy access
pub use call_control::*;
pub use lifecycle::*;
