//! Domain layer for conclave
//!
//! This crate contains the core entities, value objects and pure decision
//! rules. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A user request is negotiated by several independent agents:
//!
//! - **Analyze**: every agent analyzes the request on its own
//! - **Discuss**: agents review each other's latest responses for a fixed
//!   number of rounds
//! - **Consensus**: every surviving agent proposes a plan, the most confident
//!   proposal wins (first-registered agent wins ties)
//! - **Execute**: the winning plan's steps are handed to their actors in order
//!
//! ## Session
//!
//! A [`Session`] holds the phase and transcript of one conversation. It is
//! owned by exactly one worker and never shared between conversations.

pub mod agent;
pub mod consensus;
pub mod core;
pub mod event;
pub mod execution;
pub mod session;

// Re-export commonly used types
pub use agent::{
    status::{AgentState, AgentStatus},
    value_objects::{AgentId, Confidence},
};
pub use consensus::{
    proposal::{Executor, Proposal, WorkflowStep},
    selection::{ConsensusResult, compare_proposals, select_proposal},
};
pub use core::{error::DomainError, string::truncate};
pub use event::SessionEvent;
pub use execution::{ExecutionResult, ExecutionStatus, StepOutcome};
pub use session::{
    entities::{Session, SessionId},
    phase::Phase,
    response::{AgentResponse, ResponseKind},
    round::{DiscussionRound, DiscussionTranscript},
};
