//! Asynchronous events and the per-session event queue
//!
//! Producers (timers, external collaborators) hold an [`EventSender`] and post
//! from any task or thread. The flow controller is the single consumer and
//! drains the [`EventQueue`] in post order.

use crate::domain::session::{CorrelationToken, SessionId};
use crate::types::Variable;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::trace;

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A scheduled timer expired
    Timeout,
    /// An external operation finished with a result
    Completed(Variable),
    /// An external operation failed
    Failed(String),
    /// The underlying connection ended
    ConnectionLost,
}

/// A tagged notification queued for the controller
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEvent {
    /// The kind of event and its payload
    pub kind: EventKind,

    /// The wait this event satisfies, if any
    pub token: Option<CorrelationToken>,

    /// When the event was posted
    pub posted_at: DateTime<Utc>,
}

impl FlowEvent {
    /// Create an event of the given kind
    pub fn new(kind: EventKind, token: Option<CorrelationToken>) -> Self {
        Self {
            kind,
            token,
            posted_at: Utc::now(),
        }
    }

    /// Timer expiry for `token`
    pub fn timeout(token: CorrelationToken) -> Self {
        Self::new(EventKind::Timeout, Some(token))
    }

    /// Successful completion of the operation behind `token`
    pub fn completed(token: CorrelationToken, value: Variable) -> Self {
        Self::new(EventKind::Completed(value), Some(token))
    }

    /// Failure of the operation behind `token`
    pub fn failed(token: CorrelationToken, reason: impl Into<String>) -> Self {
        Self::new(EventKind::Failed(reason.into()), Some(token))
    }

    /// The connection behind the session went away
    pub fn connection_lost() -> Self {
        Self::new(EventKind::ConnectionLost, None)
    }

    /// Whether this event carries `token`
    #[inline]
    pub fn matches(&self, token: &CorrelationToken) -> bool {
        self.token.as_ref() == Some(token)
    }

    /// Whether this is a timer expiry for `token`
    #[inline]
    pub fn is_timeout_for(&self, token: &CorrelationToken) -> bool {
        self.kind == EventKind::Timeout && self.matches(token)
    }
}

/// Producer side of a session's event queue
#[derive(Debug, Clone)]
pub struct EventSender {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<FlowEvent>,
}

impl EventSender {
    /// Append an event. Never blocks.
    ///
    /// Returns `false` when the session has already terminated, in which
    /// case the event is dropped.
    pub fn post(&self, event: FlowEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                trace!(
                    session_id = %self.session_id,
                    kind = ?event.kind,
                    "Dropping event posted after session termination"
                );
                false
            }
        }
    }

    /// The session this sender feeds
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Whether the consumer side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of a session's event queue
#[derive(Debug)]
pub struct EventQueue {
    session_id: SessionId,
    rx: mpsc::UnboundedReceiver<FlowEvent>,
}

impl EventQueue {
    /// Remove and return the next event, suspending until one is available.
    ///
    /// Returns `None` once the queue is closed and drained, or when every
    /// sender has been dropped.
    pub async fn take(&mut self) -> Option<FlowEvent> {
        self.rx.recv().await
    }

    /// Remove the next event if one is already buffered
    pub fn try_take(&mut self) -> Option<FlowEvent> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting posts. Buffered events are discarded.
    pub fn close(&mut self) {
        self.rx.close();
        let mut dropped = 0usize;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            trace!(session_id = %self.session_id, dropped, "Discarded buffered events on close");
        }
    }

    /// The session this queue belongs to
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Create the event queue for a session
pub fn event_queue(session_id: SessionId) -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventSender {
            session_id: session_id.clone(),
            tx,
        },
        EventQueue { session_id, rx },
    )
}
