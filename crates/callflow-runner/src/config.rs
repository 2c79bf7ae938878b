//! Configuration for the callflow runner
//!
//! The runner reads an optional YAML file named by `CALLFLOW_CONFIG`, then
//! applies environment overrides for the flow settings and the call facts.

use callflow_core::{FlowConfig, SessionInfo};
use callflow_stdlib::WeekRoutingTargets;
use serde::{Deserialize, Serialize};
use std::{env, fs};
use tracing::{info, warn};

use crate::error::{RunnerError, RunnerResult};

/// Runner configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Executor settings
    #[serde(flatten)]
    pub flow: FlowConfig,

    /// Week routing destinations
    #[serde(default)]
    pub targets: WeekRoutingTargets,

    /// Facts about the simulated call
    #[serde(default)]
    pub session: SessionInfo,
}

impl RunnerConfig {
    /// Load configuration from the optional config file and environment variables
    pub fn load() -> RunnerResult<Self> {
        let mut config = match env::var("CALLFLOW_CONFIG") {
            Ok(path) => {
                let yaml = fs::read_to_string(&path).map_err(|e| {
                    RunnerError::ConfigError(format!("Cannot read {}: {}", path, e))
                })?;
                info!(path = %path, "Reading configuration file");
                Self::from_yaml_str(&yaml)?
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.flow.validate()?;
        Ok(config)
    }

    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> RunnerResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RunnerError::ConfigError(e.to_string()))
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.flow.apply_overrides(&lookup);

        if let Some(ani) = lookup("CALLFLOW_ANI") {
            self.session.caller_id = ani;
        }

        if let Some(call_id) = lookup("CALLFLOW_CALL_ID") {
            self.session.call_id = call_id;
        }

        if let Some(dnis) = lookup("CALLFLOW_DNIS") {
            self.session.dnis = dnis;
        }

        if let Some(did) = lookup("CALLFLOW_DID") {
            self.session.did = did;
        }

        if let Some(delay) = lookup("CALLFLOW_TRANSFER_DELAY_MS") {
            if let Ok(delay) = delay.parse::<u64>() {
                self.targets.delay_ms = delay;
            } else {
                warn!("Invalid CALLFLOW_TRANSFER_DELAY_MS value: {}", delay);
            }
        }
    }
}
