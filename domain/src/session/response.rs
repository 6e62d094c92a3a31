//! Agent responses produced during the Analyze and Discuss phases.

use crate::agent::value_objects::{AgentId, Confidence};
use crate::consensus::proposal::WorkflowStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which call produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Result of `analyze`
    Analysis,
    /// Result of `review` in a discussion round
    Feedback,
}

impl ResponseKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseKind::Analysis => "analysis",
            ResponseKind::Feedback => "feedback",
        }
    }
}

/// Response from a single agent (Value Object)
///
/// Either a successful payload or an error-tagged record; an agent that
/// failed or timed out is represented by a response with `error` set rather
/// than by a missing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The agent that produced this response
    pub agent: AgentId,
    pub kind: ResponseKind,
    /// Free-form analysis or feedback text
    pub content: String,
    /// Confidence (analysis) or collaboration score (feedback)
    pub confidence: Confidence,
    /// Discussion round (feedback only, 0-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<usize>,
    /// Structured plan the agent already has in mind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Vec<WorkflowStep>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Cross-agent hints merged into the session's working context
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hints: BTreeMap<String, String>,
    /// Error message if the call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    /// Creates a successful analysis.
    pub fn analysis(
        agent: impl Into<AgentId>,
        content: impl Into<String>,
        confidence: impl Into<Confidence>,
    ) -> Self {
        Self {
            agent: agent.into(),
            kind: ResponseKind::Analysis,
            content: content.into(),
            confidence: confidence.into(),
            round: None,
            plan: None,
            suggestions: Vec::new(),
            hints: BTreeMap::new(),
            error: None,
        }
    }

    /// Creates a successful feedback entry for a discussion round.
    pub fn feedback(
        agent: impl Into<AgentId>,
        round: usize,
        content: impl Into<String>,
        collaboration_score: impl Into<Confidence>,
    ) -> Self {
        Self {
            kind: ResponseKind::Feedback,
            round: Some(round),
            ..Self::analysis(agent, content, collaboration_score)
        }
    }

    /// Creates an error-tagged response.
    pub fn failure(
        agent: impl Into<AgentId>,
        kind: ResponseKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            error: Some(error.into()),
            ..Self::analysis(agent, String::new(), Confidence::MIN)
        }
    }

    pub fn with_round(mut self, round: usize) -> Self {
        self.round = Some(round);
        self
    }

    pub fn with_plan(mut self, plan: Vec<WorkflowStep>) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key.into(), value.into());
        self
    }

    /// Re-attributes the response to the agent that was actually called.
    pub fn attributed_to(mut self, agent: &AgentId) -> Self {
        self.agent = agent.clone();
        self
    }

    /// Returns `true` if this response carries no error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
