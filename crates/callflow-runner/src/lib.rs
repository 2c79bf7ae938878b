//!
//! Callflow Runner - runs the week routing sample as a single session
//!

use callflow_core::{SessionBuilder, SessionSummary};
use callflow_stdlib::{build_week_routing_flow, CallControl, CallControlLifecycle};
use std::sync::Arc;
use tracing::info;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Logging setup
pub mod telemetry;

// Re-export key types
pub use config::RunnerConfig;
pub use error::{RunnerError, RunnerResult};

/// Run one week routing session against `call` and wait for it to end
pub async fn run(config: RunnerConfig, call: Arc<dyn CallControl>) -> RunnerResult<SessionSummary> {
    let registry = build_week_routing_flow(call.clone(), &config.targets);

    let (controller, handle) = SessionBuilder::new(registry)
        .with_config(config.flow)
        .with_session_info(config.session)
        .with_lifecycle(Arc::new(CallControlLifecycle::new(call)))
        .build();

    info!(session_id = %handle.session_id(), "Starting session");
    let summary = controller.run().await?;
    info!(
        session_id = %summary.session_id,
        steps = summary.steps_executed,
        "Session ended"
    );

    Ok(summary)
}
