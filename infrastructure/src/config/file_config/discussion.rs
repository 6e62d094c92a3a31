//! Discussion configuration from TOML (`[discussion]` section)

use conclave_application::DiscussionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw discussion configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Number of peer review rounds
    pub rounds: usize,
    /// Per-call agent timeout in seconds
    pub call_timeout_secs: u64,
    /// Per-session event buffer size
    pub event_buffer: usize,
    /// Seconds of inactivity before a session is retired (0 = never)
    pub idle_timeout_secs: u64,
    /// Run independent steps of a collaborative plan concurrently
    pub allow_parallel_steps: bool,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            call_timeout_secs: 10,
            event_buffer: 256,
            idle_timeout_secs: 600,
            allow_parallel_steps: true,
        }
    }
}

impl FileDiscussionConfig {
    pub fn to_discussion_config(&self) -> DiscussionConfig {
        let idle =
            (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs));
        DiscussionConfig::default()
            .with_rounds(self.rounds)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_event_buffer(self.event_buffer)
            .with_idle_timeout(idle)
            .with_parallel_steps(self.allow_parallel_steps)
    }
}
