//! Application layer for conclave
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod event_channel;
pub mod ports;
pub mod registry;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::DiscussionConfig;
pub use event_channel::{EventPublisher, EventSubscriber, TryRecvError, event_channel};
pub use ports::{
    agent_adapter::{AgentAdapter, AgentError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
};
pub use registry::{AgentRegistry, RegistryError};
pub use use_cases::consensus::ConsensusSelector;
pub use use_cases::discussion::{DiscussionCoordinator, active_agents};
pub use use_cases::execution::ExecutionDispatcher;
pub use use_cases::orchestrate::{
    AgentHealth, HealthReport, Orchestrator, OrchestratorError, PhaseFailure,
};
