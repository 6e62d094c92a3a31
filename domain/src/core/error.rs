//! Domain error types

use crate::session::phase::Phase;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("A cycle is already running in phase {0}")]
    CycleInProgress(Phase),
}
