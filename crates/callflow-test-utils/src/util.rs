//! Utility functions shared by tests.

use crate::error::TestError;
use callflow_core::{FlowController, SessionSummary};
use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG` and defaults to `debug` for the callflow crates.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("callflow_core=debug,callflow_stdlib=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Run a session, failing if it has not terminated within `limit`.
///
/// With paused tokio time the limit is measured on the virtual clock.
pub async fn run_with_timeout(
    controller: FlowController,
    limit: Duration,
) -> Result<SessionSummary, TestError> {
    match tokio::time::timeout(limit, controller.run()).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(TestError::Timeout(format!(
            "session still running after {:?}",
            limit
        ))),
    }
}
