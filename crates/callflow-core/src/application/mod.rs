/// Session lifecycle notifications
pub mod lifecycle;

/// The per-session executor
pub mod flow_controller;

/// Session wiring and the external handle
pub mod session_builder;
