//!
//! Standard library of steps for callflow sessions
//!

pub mod components;

/// Telephony seam used by the call steps
pub mod telephony;

/// Week-based on-call routing sample
pub mod week_routing;

pub use telephony::{CallControl, CallControlLifecycle, LoggingCallControl};
pub use week_routing::{
    build_week_routing_flow, build_week_routing_flow_with_clock, week_of_year, week_value,
    WeekRoutingTargets,
};
