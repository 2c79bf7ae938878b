//! Test implementations (fakes) of the callflow collaborator interfaces.
//!
//! These fakes record what happened instead of asserting expectations up
//! front, which keeps multi-step scenario tests readable.

pub mod recording_call;
pub mod recording_lifecycle;
pub mod scripted_step;

// Re-export all implementations for easy access
pub use recording_call::*;
pub use recording_lifecycle::*;
pub use scripted_step::*;
