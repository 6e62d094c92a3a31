//! Agent Adapter port
//!
//! Defines the uniform capability contract every participating agent
//! implements. The orchestration core only ever talks to agents through
//! this trait; concrete agents live in the infrastructure layer.

use async_trait::async_trait;
use conclave_domain::{
    AgentId, AgentResponse, AgentStatus, DiscussionTranscript, Proposal, WorkflowStep,
};
use thiserror::Error;

/// Errors an agent call can surface.
///
/// The core treats every variant the same way: the call is recorded as an
/// error record attributed to the agent and the cycle moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Agent unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out after {0} ms")]
    Timeout(u128),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Capability contract of one participating agent.
///
/// Implementations must be safe to call concurrently from several sessions.
/// A returned record may carry an error payload instead of failing the call;
/// the core normalizes both forms identically.
#[async_trait]
pub trait AgentAdapter: Send + Sync {
    /// Stable, unique identifier used in every record this agent produces.
    fn id(&self) -> &AgentId;

    /// Independent first analysis of a request.
    async fn analyze(&self, request: &str) -> Result<AgentResponse, AgentError>;

    /// Critique peers' latest responses during discussion round `round`.
    async fn review(
        &self,
        peers: &[AgentResponse],
        round: usize,
    ) -> Result<AgentResponse, AgentError>;

    /// Produce a proposal from the full discussion transcript.
    async fn propose(&self, transcript: &DiscussionTranscript) -> Result<Proposal, AgentError>;

    /// Carry out one workflow step and return its output.
    async fn execute_step(&self, step: &WorkflowStep) -> Result<String, AgentError>;

    /// Current self-reported status. Must not block or mutate state.
    fn status(&self) -> AgentStatus;
}
