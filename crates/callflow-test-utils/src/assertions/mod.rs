//! Assertion utilities for validating callflow sessions.
//!
//! This module provides helper functions for checking how a session ended,
//! making scenario tests more concise and readable.

mod session;

// Re-export all assertion helpers for easy access
pub use session::*;
