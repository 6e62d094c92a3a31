//! Consensus selection rule.

use super::proposal::Proposal;
use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Reason used when no proposal survives filtering.
pub const NO_VALID_PROPOSAL: &str = "no agent produced a valid proposal";

/// Outcome of the consensus phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConsensusResult {
    /// A proposal was selected
    Reached(Proposal),
    /// No proposal could be selected
    Failed { reason: String },
}

impl ConsensusResult {
    pub fn is_reached(&self) -> bool {
        matches!(self, ConsensusResult::Reached(_))
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        match self {
            ConsensusResult::Reached(p) => Some(p),
            ConsensusResult::Failed { .. } => None,
        }
    }
}

/// Select the winning proposal.
///
/// Error-tagged proposals never win. Among the rest, the highest confidence
/// wins; equal confidences go to the agent that appears first in
/// `priority` (registration order). Agents missing from `priority` rank
/// after every registered agent, ordered by id.
///
/// # Example
///
/// ```
/// use conclave_domain::{AgentId, ConsensusResult, Proposal, select_proposal};
///
/// let priority = vec![AgentId::new("planner"), AgentId::new("executor")];
/// let proposals = vec![
///     Proposal::new("executor", "Run it directly", 0.9, "executor"),
///     Proposal::new("planner", "Plan, then run", 0.9, "all"),
/// ];
///
/// let result = select_proposal(&proposals, &priority);
/// assert_eq!(result.proposal().unwrap().agent.as_str(), "planner");
/// ```
pub fn select_proposal(proposals: &[Proposal], priority: &[AgentId]) -> ConsensusResult {
    proposals
        .iter()
        .filter(|p| p.is_success())
        .min_by(|a, b| compare_proposals(a, b, priority))
        .map(|winner| ConsensusResult::Reached(winner.clone()))
        .unwrap_or_else(|| ConsensusResult::Failed {
            reason: NO_VALID_PROPOSAL.to_string(),
        })
}

/// Best-first ordering of proposals: confidence descending, then
/// registration priority, then agent id.
pub fn compare_proposals(a: &Proposal, b: &Proposal, priority: &[AgentId]) -> Ordering {
    let rank = |agent: &AgentId| {
        priority
            .iter()
            .position(|p| p == agent)
            .unwrap_or(usize::MAX)
    };
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| rank(&a.agent).cmp(&rank(&b.agent)))
        .then_with(|| a.agent.cmp(&b.agent))
}
