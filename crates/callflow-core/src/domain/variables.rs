use crate::{types::Variable, CoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key holding the caller number
pub const ANI: &str = "session.ani";
/// Key holding the call id assigned by the telephony layer
pub const CALL_ID: &str = "session.callid";
/// Key holding the dialed number
pub const DNIS: &str = "session.dnis";
/// Key holding the external number the call arrived on
pub const DID: &str = "session.did";
/// Key holding the prompt folder
pub const AUDIO_FOLDER: &str = "session.audioFolder";
/// Key holding the extension that transferred the call, if any
pub const TRANSFERRING_EXTENSION: &str = "session.transferingExtension";
/// Key holding the extension that forwarded the call, if any
pub const FORWARDING_EXTENSION: &str = "session.forwardingExtension";

/// Facts about the call a session was created for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionInfo {
    /// Caller number
    pub caller_id: String,

    /// Call id from the telephony layer
    pub call_id: String,

    /// Dialed number
    pub dnis: String,

    /// External number the call came in on
    pub did: String,

    /// Folder holding prompts for this project
    pub audio_folder: String,

    /// Extension that transferred the call here
    pub transferring_extension: Option<String>,

    /// Extension that forwarded the call here
    pub forwarding_extension: Option<String>,
}

/// Per-session key/value bag readable and writable by any step
///
/// Values are stored as-is; reading a key that was never written is an
/// error rather than a default.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    values: HashMap<String, Variable>,
}

impl VariableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the well-known `session.*` keys from the call facts
    pub fn initialize(&mut self, info: &SessionInfo) {
        self.set(ANI, info.caller_id.as_str());
        self.set(CALL_ID, info.call_id.as_str());
        self.set(DNIS, info.dnis.as_str());
        self.set(DID, info.did.as_str());
        self.set(AUDIO_FOLDER, info.audio_folder.as_str());
        self.set(
            TRANSFERRING_EXTENSION,
            info.transferring_extension.clone().unwrap_or_default(),
        );
        self.set(
            FORWARDING_EXTENSION,
            info.forwarding_extension.clone().unwrap_or_default(),
        );
    }

    /// Store `value` under `key`, replacing any earlier value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Variable>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read the value under `key`
    pub fn get(&self, key: &str) -> Result<&Variable, CoreError> {
        self.values
            .get(key)
            .ok_or_else(|| CoreError::VariableNotFound(key.to_string()))
    }

    /// Remove `key`, returning its value if it was set
    pub fn remove(&mut self, key: &str) -> Option<Variable> {
        self.values.remove(key)
    }

    /// Whether `key` has been written
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stored keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
