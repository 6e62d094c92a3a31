//! Session domain entities

use crate::agent::value_objects::AgentId;
use crate::consensus::proposal::Proposal;
use crate::core::error::DomainError;
use crate::session::phase::Phase;
use crate::session::response::AgentResponse;
use crate::session::round::{DiscussionRound, DiscussionTranscript};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identifier of a live conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for SessionId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-conversation negotiation record (Entity)
///
/// A session lives as long as its conversation and negotiates one message
/// per *cycle*. Starting a cycle clears the previous message's responses,
/// rounds and proposals; the working context survives across cycles.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    phase: Phase,
    cycle: u64,
    request: Option<String>,
    initial: Vec<AgentResponse>,
    rounds: Vec<DiscussionRound>,
    proposals: Vec<Proposal>,
    context: BTreeMap<String, String>,
    failure: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            phase: Phase::Idle,
            cycle: 0,
            request: None,
            initial: Vec::new(),
            rounds: Vec::new(),
            proposals: Vec::new(),
            context: BTreeMap::new(),
            failure: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of cycles started so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    pub fn initial_responses(&self) -> &[AgentResponse] {
        &self.initial
    }

    pub fn rounds(&self) -> &[DiscussionRound] {
        &self.rounds
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.context.insert(key.into(), value.into());
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Start negotiating a new message.
    pub fn begin_cycle(&mut self, request: impl Into<String>) -> Result<(), DomainError> {
        if !self.phase.accepts_new_cycle() {
            return Err(DomainError::CycleInProgress(self.phase));
        }
        self.phase = Phase::Idle;
        self.cycle += 1;
        self.request = Some(request.into());
        self.initial.clear();
        self.rounds.clear();
        self.proposals.clear();
        self.failure = None;
        Ok(())
    }

    /// Move to the next phase; rejects anything but a legal transition.
    pub fn transition(&mut self, to: Phase) -> Result<(), DomainError> {
        if !self.phase.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition(Phase::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    pub fn record_initial(&mut self, response: AgentResponse) {
        self.absorb_hints(&response);
        self.initial.push(response);
    }

    pub fn record_round(&mut self, round: DiscussionRound) {
        for response in &round.responses {
            self.absorb_hints(response);
        }
        self.rounds.push(round);
    }

    pub fn record_proposal(&mut self, proposal: Proposal) {
        self.proposals.push(proposal);
    }

    /// Agents whose analysis succeeded, in arrival order.
    pub fn analyzed_agents(&self) -> Vec<AgentId> {
        self.initial
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.agent.clone())
            .collect()
    }

    /// Snapshot of the discussion so far.
    pub fn transcript(&self) -> DiscussionTranscript {
        DiscussionTranscript {
            request: self.request.clone().unwrap_or_default(),
            context: self.context.clone(),
            initial: self.initial.clone(),
            rounds: self.rounds.clone(),
        }
    }

    fn absorb_hints(&mut self, response: &AgentResponse) {
        if !response.is_success() {
            return;
        }
        for (key, value) in &response.hints {
            self.context.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::response::ResponseKind;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new("sid-1");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.cycle(), 0);
        assert!(session.request().is_none());
    }

    #[test]
    fn test_full_cycle() {
        let mut session = Session::new("sid-1");
        session.begin_cycle("search the web").unwrap();
        for phase in [
            Phase::Analyzing,
            Phase::Discussing,
            Phase::ConsensusReached,
            Phase::Executing,
            Phase::Completed,
        ] {
            session.transition(phase).unwrap();
        }
        assert_eq!(session.phase(), Phase::Completed);
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let mut session = Session::new("sid-1");
        session.begin_cycle("x").unwrap();
        let err = session.transition(Phase::Executing).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: Phase::Idle,
                to: Phase::Executing
            }
        );
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_begin_cycle_rejected_mid_phase() {
        let mut session = Session::new("sid-1");
        session.begin_cycle("first").unwrap();
        session.transition(Phase::Analyzing).unwrap();
        assert_eq!(
            session.begin_cycle("second"),
            Err(DomainError::CycleInProgress(Phase::Analyzing))
        );
    }

    #[test]
    fn test_new_cycle_clears_transcript_but_keeps_context() {
        let mut session = Session::new("sid-1");
        session.begin_cycle("first").unwrap();
        session.transition(Phase::Analyzing).unwrap();
        session.record_initial(
            AgentResponse::analysis("planner", "analysis", 0.9).with_hint("approach", "code"),
        );
        session.fail("stop").unwrap();
        assert_eq!(session.failure_reason(), Some("stop"));

        session.begin_cycle("second").unwrap();
        assert_eq!(session.cycle(), 2);
        assert!(session.initial_responses().is_empty());
        assert!(session.failure_reason().is_none());
        assert_eq!(session.context().get("approach").map(String::as_str), Some("code"));
    }

    #[test]
    fn test_failed_responses_do_not_leak_hints() {
        let mut session = Session::new("sid-1");
        session.record_initial(
            AgentResponse::failure("executor", ResponseKind::Analysis, "down")
                .with_hint("should", "not appear"),
        );
        assert!(session.context().is_empty());
        assert!(session.analyzed_agents().is_empty());
    }

    #[test]
    fn test_transcript_snapshot() {
        let mut session = Session::new("sid-1");
        session.begin_cycle("check uptime").unwrap();
        session.set_context("locale", "ko");
        session.record_initial(AgentResponse::analysis("planner", "a", 0.5));
        let mut round = DiscussionRound::new(0);
        round.record(AgentResponse::feedback("planner", 0, "f", 0.8));
        session.record_round(round);

        let transcript = session.transcript();
        assert_eq!(transcript.request, "check uptime");
        assert_eq!(transcript.initial.len(), 1);
        assert_eq!(transcript.rounds.len(), 1);
        assert_eq!(transcript.context["locale"], "ko");
    }
}
