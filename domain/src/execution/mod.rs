//! Execution value objects - outcome of running the winning plan.

use crate::agent::value_objects::AgentId;
use crate::consensus::proposal::{Executor, WorkflowStep};
use serde::{Deserialize, Serialize};

/// Result of one workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Step index (1-based)
    pub index: usize,
    /// Agent the step was routed to
    pub actor: AgentId,
    pub action: String,
    pub success: bool,
    /// Output text on success, failure description otherwise
    pub output: String,
}

impl StepOutcome {
    pub fn success(step: &WorkflowStep, output: impl Into<String>) -> Self {
        Self {
            index: step.index,
            actor: step.actor.clone(),
            action: step.action.clone(),
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(step: &WorkflowStep, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(step, reason)
        }
    }
}

/// Overall status of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every step succeeded (or there were no steps)
    Success,
    /// At least one step failed and at least one succeeded
    Partial,
    /// Every step failed
    Failure,
}

impl ExecutionStatus {
    pub fn from_outcomes(outcomes: &[StepOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| !o.success).count();
        if failed == 0 {
            ExecutionStatus::Success
        } else if failed == outcomes.len() {
            ExecutionStatus::Failure
        } else {
            ExecutionStatus::Partial
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Partial => "partial",
            ExecutionStatus::Failure => "failure",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complete result of executing a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Summary of the executed proposal
    pub summary: String,
    pub executor: Executor,
    /// Outcomes in step order
    pub outcomes: Vec<StepOutcome>,
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    pub fn new(summary: impl Into<String>, executor: Executor, outcomes: Vec<StepOutcome>) -> Self {
        let status = ExecutionStatus::from_outcomes(&outcomes);
        Self {
            summary: summary.into(),
            executor,
            outcomes,
            status,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}
