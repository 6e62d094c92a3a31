//! Application-level configuration.
//!
//! - [`DiscussionConfig`]: round count, per-call timeout, event buffering and
//!   session lifetime used by the orchestration use cases

pub mod discussion_config;

pub use discussion_config::DiscussionConfig;
