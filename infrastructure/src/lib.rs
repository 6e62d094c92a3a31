//! Infrastructure layer for conclave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: profile-driven agents, configuration file
//! loading and the JSONL conversation log.

pub mod agents;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use agents::{AgentProfile, ProfileAgent, build_registry};
pub use config::{
    ConfigError, ConfigIssue, ConfigIssueCode, ConfigLoader, FileAgentConfig, FileConfig,
    FileDiscussionConfig, FileLogConfig, FileOutputConfig, FileOutputFormat, Severity,
};
pub use logging::JsonlConversationLogger;
