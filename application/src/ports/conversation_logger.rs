//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording negotiation events
//! (analyses, reviews, proposals, step outcomes) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! negotiation transcript in a machine-readable format (JSONL).

use conclave_domain::SessionId;
use serde_json::Value;

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "analysis", "review", "proposal").
    pub event_type: &'static str,
    /// Session the event belongs to.
    pub session: SessionId,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, session: &SessionId, payload: Value) -> Self {
        Self {
            event_type,
            session: session.clone(),
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and infallible; write failures are swallowed by the
/// implementation and never reach the negotiation cycle.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
