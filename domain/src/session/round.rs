//! Discussion history: rounds and the transcript handed to `propose`.

use crate::agent::value_objects::{AgentId, Confidence};
use crate::session::response::AgentResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One peer-review round (Entity)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscussionRound {
    /// Round index (0-based)
    pub index: usize,
    /// Feedback in arrival order, error-tagged entries included
    pub responses: Vec<AgentResponse>,
}

impl DiscussionRound {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            responses: Vec::new(),
        }
    }

    pub fn record(&mut self, response: AgentResponse) {
        self.responses.push(response);
    }

    pub fn get(&self, agent: &AgentId) -> Option<&AgentResponse> {
        self.responses.iter().find(|r| &r.agent == agent)
    }

    pub fn successful(&self) -> impl Iterator<Item = &AgentResponse> {
        self.responses.iter().filter(|r| r.is_success())
    }

    pub fn failed_agents(&self) -> impl Iterator<Item = &AgentId> {
        self.responses
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| &r.agent)
    }
}

/// Everything said during Analyze and Discuss, as seen by `propose`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscussionTranscript {
    /// The user request under negotiation
    pub request: String,
    /// Session working context at the time the transcript was taken
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Initial analyses in arrival order
    pub initial: Vec<AgentResponse>,
    pub rounds: Vec<DiscussionRound>,
}

impl DiscussionTranscript {
    /// The agent's analysis, if it produced one.
    pub fn initial_for(&self, agent: &AgentId) -> Option<&AgentResponse> {
        self.initial.iter().find(|r| &r.agent == agent)
    }

    /// The agent's most recent error-free response across analysis and rounds.
    pub fn latest_for(&self, agent: &AgentId) -> Option<&AgentResponse> {
        self.rounds
            .iter()
            .rev()
            .find_map(|round| round.get(agent).filter(|r| r.is_success()))
            .or_else(|| self.initial_for(agent).filter(|r| r.is_success()))
    }

    /// Scores of the agent's own successful feedback, one per round it answered.
    pub fn feedback_scores(&self, agent: &AgentId) -> Vec<Confidence> {
        self.rounds
            .iter()
            .filter_map(|round| round.get(agent))
            .filter(|r| r.is_success())
            .map(|r| r.confidence)
            .collect()
    }

    /// Mean feedback score of the agent, `None` if it gave no feedback.
    pub fn average_feedback_score(&self, agent: &AgentId) -> Option<f64> {
        let scores = self.feedback_scores(agent);
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().map(Confidence::value).sum::<f64>() / scores.len() as f64)
    }
}
