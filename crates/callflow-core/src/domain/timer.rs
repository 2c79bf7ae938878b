//! One-shot timers that post timeout events into a session's event queue

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, trace};
use uuid::Uuid;

use super::events::{EventSender, FlowEvent};
use super::session::CorrelationToken;
use crate::CoreError;

/// Schedules per-step timeouts
#[async_trait]
pub trait TimerService: Send + Sync {
    /// Arm a one-shot timer. On expiry a single `Timeout` event carrying
    /// `token` is posted. A zero duration fires immediately. Scheduling a
    /// token that is already armed replaces the earlier timer.
    async fn schedule(&self, duration: Duration, token: CorrelationToken) -> Result<(), CoreError>;

    /// Disarm a pending timer. Returns `false` if it already fired or never existed.
    async fn cancel(&self, token: &CorrelationToken) -> Result<bool, CoreError>;

    /// Disarm every pending timer and return how many were cancelled
    async fn cancel_all(&self) -> Result<usize, CoreError>;

    /// Number of armed timers
    fn pending(&self) -> usize;
}

/// Convert signed milliseconds into a timer duration.
/// Non-positive values mean "already expired".
pub fn duration_from_millis(millis: i64) -> Duration {
    if millis <= 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(millis as u64)
    }
}

struct TimerEntry {
    id: Uuid,
    abort: Option<AbortHandle>,
}

/// Timer manager backed by tokio tasks
///
/// Each armed timer owns an entry in a concurrent map. A timer only posts if
/// it can still remove its own entry, so a cancel that wins the race
/// guarantees no event.
pub struct TokioTimerManager {
    timers: Arc<DashMap<CorrelationToken, TimerEntry>>,
    events: EventSender,
}

impl TokioTimerManager {
    /// Create a timer manager posting into `events`
    pub fn new(events: EventSender) -> Self {
        Self {
            timers: Arc::new(DashMap::with_capacity(4)),
            events,
        }
    }

    fn disarm(entry: TimerEntry) {
        if let Some(abort) = entry.abort {
            abort.abort();
        }
    }
}

#[async_trait]
impl TimerService for TokioTimerManager {
    async fn schedule(&self, duration: Duration, token: CorrelationToken) -> Result<(), CoreError> {
        if let Some((_, previous)) = self.timers.remove(&token) {
            debug!(token = %token, "Replacing armed timer");
            Self::disarm(previous);
        }

        if duration.is_zero() {
            trace!(token = %token, "Timer scheduled with zero duration, firing immediately");
            self.events.post(FlowEvent::timeout(token));
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::TimerError(format!("No async runtime for timer: {}", e)))?;

        let id = Uuid::new_v4();
        self.timers.insert(token.clone(), TimerEntry { id, abort: None });

        let timers = self.timers.clone();
        let events = self.events.clone();
        let fired_token = token.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if timers
                .remove_if(&fired_token, |_, entry| entry.id == id)
                .is_some()
            {
                trace!(token = %fired_token, "Timer expired");
                events.post(FlowEvent::timeout(fired_token));
            }
        });

        match self.timers.get_mut(&token) {
            Some(mut entry) if entry.id == id => entry.abort = Some(handle.abort_handle()),
            // Already fired or replaced; nothing to keep.
            _ => {}
        }

        trace!(token = %token, ?duration, "Timer armed");
        Ok(())
    }

    async fn cancel(&self, token: &CorrelationToken) -> Result<bool, CoreError> {
        match self.timers.remove(token) {
            Some((_, entry)) => {
                Self::disarm(entry);
                trace!(token = %token, "Timer cancelled");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cancel_all(&self) -> Result<usize, CoreError> {
        let tokens: Vec<CorrelationToken> = self.timers.iter().map(|e| e.key().clone()).collect();
        let mut cancelled = 0;
        for token in tokens {
            if let Some((_, entry)) = self.timers.remove(&token) {
                Self::disarm(entry);
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(cancelled, "Cancelled outstanding timers");
        }
        Ok(cancelled)
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }
}
