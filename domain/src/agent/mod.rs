//! Agent identity and health.
//!
//! - [`value_objects::AgentId`] - registered agent identifier
//! - [`value_objects::Confidence`] - totally ordered score in `[0.0, 1.0]`
//! - [`status::AgentStatus`] - side-effect free health snapshot

pub mod status;
pub mod value_objects;
