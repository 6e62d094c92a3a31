//! Discussion parameters: negotiation loop control.
//!
//! [`DiscussionConfig`] groups the static parameters that control a
//! negotiation cycle. They are set at initialization and never negotiated
//! between agents.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Negotiation control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionConfig {
    /// Number of peer-review rounds per cycle.
    pub rounds: usize,
    /// Timeout applied to every single agent call.
    pub call_timeout: Duration,
    /// Capacity of each session's event channel.
    pub event_buffer: usize,
    /// Sessions without messages for this long are retired.
    pub idle_timeout: Option<Duration>,
    /// Dispatch consecutive steps marked independent concurrently.
    pub allow_parallel_steps: bool,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            call_timeout: Duration::from_secs(10),
            event_buffer: 256,
            idle_timeout: Some(Duration::from_secs(600)),
            allow_parallel_steps: true,
        }
    }
}

impl DiscussionConfig {
    // ==================== Builder Methods ====================

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_parallel_steps(mut self, allow: bool) -> Self {
        self.allow_parallel_steps = allow;
        self
    }
}
