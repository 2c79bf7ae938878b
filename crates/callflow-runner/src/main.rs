use anyhow::{Context, Result};
use callflow_runner::{telemetry, RunnerConfig};
use callflow_stdlib::LoggingCallControl;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from the config file and environment variables
    let config = RunnerConfig::load().context("Failed to load configuration")?;

    telemetry::init_logging(&config.flow).context("Failed to initialize logging")?;

    let summary = callflow_runner::run(config, Arc::new(LoggingCallControl))
        .await
        .context("Session error")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to render summary")?
    );

    Ok(())
}
