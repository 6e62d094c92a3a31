//! Negotiation phases and their legal transitions.

use serde::{Deserialize, Serialize};

/// Phase of a session's current negotiation cycle
///
/// ```text
/// Idle ─▶ Analyzing ─▶ Discussing ─▶ ConsensusReached ─▶ Executing ─▶ Completed
///             │             │                │                │
///             └─────────────┴────────────────┴────────────────┴──▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No cycle running
    Idle,
    /// Every agent analyzes the request
    Analyzing,
    /// Peer review rounds
    Discussing,
    /// Proposals are collected and one is selected
    ConsensusReached,
    /// The winning plan is being executed
    Executing,
    /// The cycle finished with an execution result
    Completed,
    /// The cycle stopped with an error
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Idle => "idle",
            Phase::Analyzing => "analyzing",
            Phase::Discussing => "discussing",
            Phase::ConsensusReached => "consensus_reached",
            Phase::Executing => "executing",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Analyzing => "Analysis",
            Phase::Discussing => "Discussion",
            Phase::ConsensusReached => "Consensus",
            Phase::Executing => "Execution",
            Phase::Completed => "Completed",
            Phase::Failed => "Failed",
        }
    }

    /// Whether the cycle is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }

    /// Whether a new cycle may start from this phase
    pub fn accepts_new_cycle(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Completed | Phase::Failed)
    }

    /// The phase that normally follows this one
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::Analyzing),
            Phase::Analyzing => Some(Phase::Discussing),
            Phase::Discussing => Some(Phase::ConsensusReached),
            Phase::ConsensusReached => Some(Phase::Executing),
            Phase::Executing => Some(Phase::Completed),
            Phase::Completed | Phase::Failed => None,
        }
    }

    /// Strictly forward, one step at a time; `Failed` from any active phase.
    pub fn can_transition_to(&self, to: Phase) -> bool {
        match to {
            Phase::Failed => matches!(
                self,
                Phase::Analyzing | Phase::Discussing | Phase::ConsensusReached | Phase::Executing
            ),
            _ => self.next() == Some(to),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(Phase::Idle.can_transition_to(Phase::Analyzing));
        assert!(Phase::Analyzing.can_transition_to(Phase::Discussing));
        assert!(Phase::Discussing.can_transition_to(Phase::ConsensusReached));
        assert!(Phase::ConsensusReached.can_transition_to(Phase::Executing));
        assert!(Phase::Executing.can_transition_to(Phase::Completed));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!Phase::Idle.can_transition_to(Phase::Discussing));
        assert!(!Phase::Discussing.can_transition_to(Phase::Analyzing));
        assert!(!Phase::Completed.can_transition_to(Phase::Idle));
    }

    #[test]
    fn test_failed_reachable_from_active_phases_only() {
        for phase in [
            Phase::Analyzing,
            Phase::Discussing,
            Phase::ConsensusReached,
            Phase::Executing,
        ] {
            assert!(phase.can_transition_to(Phase::Failed), "{phase}");
        }
        assert!(!Phase::Idle.can_transition_to(Phase::Failed));
        assert!(!Phase::Completed.can_transition_to(Phase::Failed));
        assert!(!Phase::Failed.can_transition_to(Phase::Failed));
    }

    #[test]
    fn test_new_cycle_acceptance() {
        assert!(Phase::Idle.accepts_new_cycle());
        assert!(Phase::Completed.accepts_new_cycle());
        assert!(Phase::Failed.accepts_new_cycle());
        assert!(!Phase::Executing.accepts_new_cycle());
    }

    #[test]
    fn test_serialized_name_matches_as_str() {
        let json = serde_json::to_string(&Phase::ConsensusReached).unwrap();
        assert_eq!(json, "\"consensus_reached\"");
    }
}
