//! Everything a subscriber saw during one cycle.

use conclave_domain::{AgentId, ExecutionResult, Phase, SessionEvent, SessionId};
use serde::Serialize;

/// One `agent_message` event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentMessage {
    pub agent: AgentId,
    pub text: String,
}

/// Events of a single cycle, folded into one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub session: SessionId,
    pub request: String,
    /// Phases in the order they were entered
    pub phases: Vec<Phase>,
    pub messages: Vec<AgentMessage>,
    pub consensus: Option<String>,
    pub result: Option<ExecutionResult>,
    pub error: Option<String>,
    /// Events the channel dropped because the subscriber fell behind
    pub dropped_events: u64,
}

impl CycleReport {
    pub fn new(session: SessionId, request: impl Into<String>) -> Self {
        Self {
            session,
            request: request.into(),
            phases: Vec::new(),
            messages: Vec::new(),
            consensus: None,
            result: None,
            error: None,
            dropped_events: 0,
        }
    }

    /// Fold an event in. Returns `true` once the cycle is over.
    pub fn record(&mut self, event: &SessionEvent) -> bool {
        match event {
            SessionEvent::PhaseUpdate { phase, .. } => self.phases.push(*phase),
            SessionEvent::AgentMessage { agent_id, text } => self.messages.push(AgentMessage {
                agent: agent_id.clone(),
                text: text.clone(),
            }),
            SessionEvent::ConsensusReached { summary } => self.consensus = Some(summary.clone()),
            SessionEvent::ExecutionResult { result } => self.result = Some(result.clone()),
            SessionEvent::Error { message } => self.error = Some(message.clone()),
        }
        event.is_terminal()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some() || self.error.is_some()
    }

    /// Finished with an execution result whose steps all succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self
                .result
                .as_ref()
                .is_some_and(|r| r.failed() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::{Executor, StepOutcome, WorkflowStep};

    #[test]
    fn test_record_until_terminal() {
        let mut report = CycleReport::new(SessionId::new("s"), "hello");
        assert!(!report.record(&SessionEvent::phase_update(Phase::Analyzing, "")));
        assert!(!report.record(&SessionEvent::agent_message(&AgentId::new("a"), "ok")));
        assert!(!report.record(&SessionEvent::consensus_reached("plan")));
        assert!(!report.is_finished());

        let step = WorkflowStep::new(0, "a", "do it");
        let result = ExecutionResult::new(
            "plan",
            Executor::All,
            vec![StepOutcome::success(&step, "done")],
        );
        assert!(report.record(&SessionEvent::execution_result(result)));

        assert_eq!(report.phases, vec![Phase::Analyzing]);
        assert_eq!(report.messages[0].agent.as_str(), "a");
        assert_eq!(report.consensus.as_deref(), Some("plan"));
        assert!(report.is_finished());
        assert!(report.is_success());
    }

    #[test]
    fn test_error_is_not_success() {
        let mut report = CycleReport::new(SessionId::new("s"), "hello");
        assert!(report.record(&SessionEvent::error("no agent produced an analysis")));
        assert!(report.is_finished());
        assert!(!report.is_success());
    }
}
