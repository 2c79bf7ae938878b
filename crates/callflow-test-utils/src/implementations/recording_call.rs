//! Call control fake that records transfers and hang-ups.

use async_trait::async_trait;
use callflow_core::CoreError;
use callflow_stdlib::CallControl;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// In-memory call that remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingCallControl {
    transfers: Mutex<Vec<String>>,
    disconnects: Mutex<usize>,
    rejected: Mutex<HashSet<String>>,
}

impl RecordingCallControl {
    /// Create a call that accepts every transfer
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make transfers to `destination` fail
    pub fn reject(&self, destination: impl Into<String>) {
        self.rejected.lock().insert(destination.into());
    }

    /// Destinations of successful transfers, in order
    pub fn transfers(&self) -> Vec<String> {
        self.transfers.lock().clone()
    }

    /// How many times the call was hung up
    pub fn disconnects(&self) -> usize {
        *self.disconnects.lock()
    }
}

#[async_trait]
impl CallControl for RecordingCallControl {
    async fn transfer(&self, destination: &str) -> Result<(), CoreError> {
        if self.rejected.lock().contains(destination) {
            return Err(CoreError::ExternalDependencyError(format!(
                "Extension {} rejected the transfer",
                destination
            )));
        }
        self.transfers.lock().push(destination.to_string());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), CoreError> {
        *self.disconnects.lock() += 1;
        Ok(())
    }
}
