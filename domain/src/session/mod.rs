//! Session domain
//!
//! - [`phase::Phase`] - negotiation state machine
//! - [`response::AgentResponse`] - one agent's analysis or feedback
//! - [`round::DiscussionRound`] / [`round::DiscussionTranscript`] - discussion history
//! - [`entities::Session`] - per-conversation record owned by one worker

pub mod entities;
pub mod phase;
pub mod response;
pub mod round;
