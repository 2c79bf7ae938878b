//! Structured logging setup using tracing.

use callflow_core::FlowConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{RunnerError, RunnerResult};

/// Initialize structured logging
///
/// `RUST_LOG` wins over the configured filter. JSON output is meant for log
/// aggregation, the pretty format for local runs.
pub fn init_logging(config: &FlowConfig) -> RunnerResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    };

    result.map_err(|e| RunnerError::TelemetryError(e.to_string()))?;

    info!(
        project = %config.project_name,
        log_format = if config.json_logs { "json" } else { "pretty" },
        "Logging initialized"
    );

    Ok(())
}
