//! Configuration for a call flow project
//!
//! Values come from defaults, an optional YAML document and `CALLFLOW_*`
//! environment variables, in that order.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::CoreError;

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Name shown in every session span
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Consecutive retries of one step before it counts as a failure.
    /// `None` lets steps retry forever.
    #[serde(default = "default_max_step_retries")]
    pub max_step_retries: Option<u32>,

    /// Prompt folder written to `session.audioFolder`
    #[serde(default)]
    pub audio_folder: String,

    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON log lines instead of the pretty format
    #[serde(default)]
    pub json_logs: bool,
}

fn default_project_name() -> String {
    "callflow".to_string()
}

fn default_max_step_retries() -> Option<u32> {
    Some(50)
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            max_step_retries: default_max_step_retries(),
            audio_folder: String::new(),
            log_filter: default_log_filter(),
            json_logs: false,
        }
    }
}

impl FlowConfig {
    /// Load configuration from defaults and environment variables
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        info!(project = %config.project_name, "Configuration loaded");
        config
    }

    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CALLFLOW_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("CALLFLOW_PROJECT_NAME") {
            if name.trim().is_empty() {
                warn!("Ignoring empty CALLFLOW_PROJECT_NAME");
            } else {
                self.project_name = name;
            }
        }

        if let Some(retries) = lookup("CALLFLOW_MAX_STEP_RETRIES") {
            if retries.eq_ignore_ascii_case("none") {
                self.max_step_retries = None;
            } else if let Ok(n) = retries.parse::<u32>() {
                self.max_step_retries = Some(n);
            } else {
                warn!("Invalid CALLFLOW_MAX_STEP_RETRIES value: {}", retries);
            }
        }

        if let Some(folder) = lookup("CALLFLOW_AUDIO_FOLDER") {
            self.audio_folder = folder;
        }

        if let Some(filter) = lookup("CALLFLOW_LOG_FILTER") {
            self.log_filter = filter;
        }

        if let Some(json) = lookup("CALLFLOW_JSON_LOGS") {
            match json.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.json_logs = true,
                "0" | "false" | "no" => self.json_logs = false,
                _ => warn!("Invalid CALLFLOW_JSON_LOGS value: {}", json),
            }
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.project_name.trim().is_empty() {
            return Err(CoreError::ConfigurationError(
                "project_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
