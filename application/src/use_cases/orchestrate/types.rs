//! Types for the Orchestrator service.

use conclave_domain::{AgentId, AgentStatus, DomainError, SessionId};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the Orchestrator's public API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Session {0} already has a subscriber")]
    AlreadySubscribed(SessionId),

    #[error("Session {0} is closed")]
    SessionClosed(SessionId),

    #[error("Orchestrator has been shut down")]
    ShutDown,
}

/// Why a negotiation cycle ended early.
///
/// Everything except `Cancelled` is reported to the subscriber as the cycle's
/// single `error` event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhaseFailure {
    #[error("no agent produced an analysis")]
    NoAnalysis,

    #[error("{0}")]
    NoProposal(String),

    #[error("invalid session state: {0}")]
    Domain(#[from] DomainError),

    #[error("cycle cancelled")]
    Cancelled,
}

impl PhaseFailure {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PhaseFailure::Cancelled)
    }
}

/// Status of one registered agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentHealth {
    pub id: AgentId,
    pub status: AgentStatus,
}

/// Snapshot returned by [`Orchestrator::health`](super::Orchestrator::health).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Agents in registration order
    pub agents: Vec<AgentHealth>,
    pub active_sessions: usize,
    /// RFC 3339 timestamp
    pub checked_at: String,
}

impl HealthReport {
    pub fn all_active(&self) -> bool {
        self.agents.iter().all(|a| a.status.is_active())
    }
}
