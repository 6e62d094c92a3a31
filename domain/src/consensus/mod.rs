//! Consensus domain
//!
//! Every agent that stayed error-free through the discussion submits a
//! [`Proposal`](proposal::Proposal). Exactly one is selected by
//! [`select_proposal`](selection::select_proposal):
//!
//! ```text
//! proposals ──▶ drop error-tagged ──▶ max by (confidence, -registration priority)
//!                                          │
//!                      none left ──▶ ConsensusResult::Failed
//! ```
//!
//! The rule is pure and independent of the order proposals arrived in, so
//! replaying identical inputs always yields the identical result.

pub mod proposal;
pub mod selection;

pub use proposal::{Executor, Proposal, WorkflowStep};
pub use selection::{ConsensusResult, compare_proposals, select_proposal};
