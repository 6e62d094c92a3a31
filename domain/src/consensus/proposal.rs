//! Proposals and the workflow steps they are made of.

use crate::agent::value_objects::{AgentId, Confidence};
use serde::{Deserialize, Serialize};

/// One ordered, actor-addressed unit of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 1-based position; defines execution order
    pub index: usize,
    /// Agent that should carry out the step
    pub actor: AgentId,
    /// Opaque instruction interpreted by the actor
    pub action: String,
    /// The step does not depend on the step before it and may run
    /// concurrently with it when the actors differ.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub independent: bool,
}

impl WorkflowStep {
    pub fn new(index: usize, actor: impl Into<AgentId>, action: impl Into<String>) -> Self {
        Self {
            index,
            actor: actor.into(),
            action: action.into(),
            independent: false,
        }
    }

    pub fn independent(mut self) -> Self {
        self.independent = true;
        self
    }

    /// Same step, addressed to a different actor.
    pub fn readdressed(&self, actor: &AgentId) -> Self {
        Self {
            actor: actor.clone(),
            ..self.clone()
        }
    }
}

/// Who executes a proposal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Executor {
    /// A single agent runs every step
    Agent(AgentId),
    /// Each step goes to the agent named as its actor
    All,
}

impl Executor {
    pub fn is_collaborative(&self) -> bool {
        matches!(self, Executor::All)
    }

    pub fn agent(&self) -> Option<&AgentId> {
        match self {
            Executor::Agent(id) => Some(id),
            Executor::All => None,
        }
    }
}

impl From<String> for Executor {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case(AgentId::ALL) {
            Executor::All
        } else {
            Executor::Agent(AgentId::new(s))
        }
    }
}

impl From<&str> for Executor {
    fn from(s: &str) -> Self {
        Executor::from(s.to_string())
    }
}

impl From<Executor> for String {
    fn from(executor: Executor) -> Self {
        executor.to_string()
    }
}

impl std::fmt::Display for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Executor::Agent(id) => write!(f, "{}", id),
            Executor::All => write!(f, "{}", AgentId::ALL),
        }
    }
}

/// An agent's final recommended plan (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// The agent that proposed this plan
    pub agent: AgentId,
    pub summary: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub workflow: Vec<WorkflowStep>,
    pub executor: Executor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// Error message if the agent could not propose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Proposal {
    pub fn new(
        agent: impl Into<AgentId>,
        summary: impl Into<String>,
        confidence: impl Into<Confidence>,
        executor: impl Into<Executor>,
    ) -> Self {
        Self {
            agent: agent.into(),
            summary: summary.into(),
            confidence: confidence.into(),
            workflow: Vec::new(),
            executor: executor.into(),
            estimated_time: None,
            error: None,
        }
    }

    /// Creates an error-tagged proposal.
    pub fn failure(agent: impl Into<AgentId>, error: impl Into<String>) -> Self {
        let agent = agent.into();
        Self {
            executor: Executor::Agent(agent.clone()),
            error: Some(error.into()),
            ..Self::new(agent, String::new(), Confidence::MIN, Executor::All)
        }
    }

    pub fn with_steps(mut self, steps: Vec<WorkflowStep>) -> Self {
        self.workflow = steps;
        self
    }

    /// Append a step numbered after the current last one.
    pub fn with_step(mut self, actor: impl Into<AgentId>, action: impl Into<String>) -> Self {
        let index = self.workflow.iter().map(|s| s.index).max().unwrap_or(0) + 1;
        self.workflow.push(WorkflowStep::new(index, actor, action));
        self
    }

    pub fn with_estimated_time(mut self, estimate: impl Into<String>) -> Self {
        self.estimated_time = Some(estimate.into());
        self
    }

    /// Re-attributes the proposal to the agent that was actually called.
    pub fn attributed_to(mut self, agent: &AgentId) -> Self {
        self.agent = agent.clone();
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Steps in execution order (stable for equal indices).
    pub fn ordered_steps(&self) -> Vec<WorkflowStep> {
        let mut steps = self.workflow.clone();
        steps.sort_by_key(|s| s.index);
        steps
    }
}
