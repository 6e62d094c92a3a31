//! Events published to a session's subscriber.
//!
//! | Event | When | Terminal |
//! |-------|------|----------|
//! | `phase_update` | once per phase entry | no |
//! | `agent_message` | once per agent result during Analyze / Discuss | no |
//! | `consensus_reached` | once, when a proposal is selected | no |
//! | `execution_result` | once, at the end of a successful cycle | yes |
//! | `error` | once, when a cycle fails | yes |

use crate::agent::value_objects::AgentId;
use crate::execution::ExecutionResult;
use crate::session::phase::Phase;
use serde::{Deserialize, Serialize};

/// Notification published on a session's event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PhaseUpdate { phase: Phase, note: String },
    AgentMessage { agent_id: AgentId, text: String },
    ConsensusReached { summary: String },
    ExecutionResult { result: ExecutionResult },
    Error { message: String },
}

impl SessionEvent {
    pub fn phase_update(phase: Phase, note: impl Into<String>) -> Self {
        SessionEvent::PhaseUpdate {
            phase,
            note: note.into(),
        }
    }

    pub fn agent_message(agent_id: &AgentId, text: impl Into<String>) -> Self {
        SessionEvent::AgentMessage {
            agent_id: agent_id.clone(),
            text: text.into(),
        }
    }

    pub fn consensus_reached(summary: impl Into<String>) -> Self {
        SessionEvent::ConsensusReached {
            summary: summary.into(),
        }
    }

    pub fn execution_result(result: ExecutionResult) -> Self {
        SessionEvent::ExecutionResult { result }
    }

    pub fn error(message: impl Into<String>) -> Self {
        SessionEvent::Error {
            message: message.into(),
        }
    }

    /// `execution_result` and `error` end a cycle and are never dropped.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::ExecutionResult { .. } | SessionEvent::Error { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::PhaseUpdate { .. } => "phase_update",
            SessionEvent::AgentMessage { .. } => "agent_message",
            SessionEvent::ConsensusReached { .. } => "consensus_reached",
            SessionEvent::ExecutionResult { .. } => "execution_result",
            SessionEvent::Error { .. } => "error",
        }
    }
}
