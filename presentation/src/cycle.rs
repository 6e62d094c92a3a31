//! Run one message through a session and collect what happened.

use crate::output::report::CycleReport;
use crate::progress::CycleObserver;
use conclave_application::{EventSubscriber, Orchestrator, OrchestratorError};
use conclave_domain::SessionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("session {0} closed before the cycle finished")]
    Closed(SessionId),
}

/// Submit `request` and read events until the cycle's terminal event.
///
/// `events` must be the session's subscriber. Events left over from an
/// earlier cycle are expected to have been drained already.
pub async fn run_cycle(
    orchestrator: &Orchestrator,
    session: &SessionId,
    events: &mut EventSubscriber,
    request: &str,
    observer: &dyn CycleObserver,
) -> Result<CycleReport, CycleError> {
    orchestrator.handle(session.clone(), request)?;

    let mut report = CycleReport::new(session.clone(), request);
    let dropped_before = events.dropped();
    while let Some(event) = events.recv().await {
        observer.on_event(&event);
        if report.record(&event) {
            break;
        }
    }
    observer.finish();
    report.dropped_events = events.dropped() - dropped_before;

    if report.is_finished() {
        Ok(report)
    } else {
        Err(CycleError::Closed(session.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use async_trait::async_trait;
    use conclave_application::{
        AgentAdapter, AgentError, AgentRegistry, DiscussionConfig, NoConversationLogger,
    };
    use conclave_domain::{
        AgentId, AgentResponse, AgentStatus, DiscussionTranscript, ExecutionStatus, Phase,
        Proposal, WorkflowStep,
    };
    use std::sync::{Arc, Mutex};

    struct EchoAgent {
        id: AgentId,
        fail_analysis: bool,
    }

    impl EchoAgent {
        fn new(id: &str) -> Self {
            Self {
                id: AgentId::new(id),
                fail_analysis: false,
            }
        }
    }

    #[async_trait]
    impl AgentAdapter for EchoAgent {
        fn id(&self) -> &AgentId {
            &self.id
        }

        async fn analyze(&self, request: &str) -> Result<AgentResponse, AgentError> {
            if self.fail_analysis {
                return Err(AgentError::Unavailable("offline".to_string()));
            }
            Ok(AgentResponse::analysis(
                self.id.clone(),
                format!("echo {}", request),
                0.8,
            ))
        }

        async fn review(
            &self,
            peers: &[AgentResponse],
            round: usize,
        ) -> Result<AgentResponse, AgentError> {
            Ok(AgentResponse::feedback(
                self.id.clone(),
                round,
                format!("saw {}", peers.len()),
                0.9,
            ))
        }

        async fn propose(&self, _: &DiscussionTranscript) -> Result<Proposal, AgentError> {
            Ok(Proposal::new(self.id.clone(), "echo plan", 0.9, self.id.to_string())
                .with_step(self.id.clone(), "echo"))
        }

        async fn execute_step(&self, step: &WorkflowStep) -> Result<String, AgentError> {
            Ok(format!("echoed '{}'", step.action))
        }

        fn status(&self) -> AgentStatus {
            AgentStatus::active(self.id.as_str())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl CycleObserver for Recorder {
        fn on_event(&self, event: &conclave_domain::SessionEvent) {
            self.0.lock().unwrap().push(event.kind().to_string());
        }

        fn finish(&self) {
            self.0.lock().unwrap().push("finish".to_string());
        }
    }

    fn orchestrator(agent: EchoAgent) -> Orchestrator {
        let registry = AgentRegistry::new().with(Arc::new(agent)).unwrap();
        Orchestrator::new(
            Arc::new(registry),
            DiscussionConfig::default().with_rounds(1),
            Arc::new(NoConversationLogger),
        )
    }

    #[tokio::test]
    async fn test_run_cycle_collects_report() {
        let orchestrator = orchestrator(EchoAgent::new("echo"));
        let session = SessionId::new("s");
        let mut events = orchestrator.connect(session.clone()).unwrap();
        let recorder = Recorder::default();

        let report = run_cycle(&orchestrator, &session, &mut events, "hi", &recorder)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(
            report.phases,
            vec![
                Phase::Analyzing,
                Phase::Discussing,
                Phase::ConsensusReached,
                Phase::Executing,
                Phase::Completed,
            ]
        );
        assert_eq!(report.messages.len(), 2);
        let result = report.result.unwrap();
        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(result.outcomes[0].output, "echoed 'echo'");

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen.last().map(String::as_str), Some("finish"));
        assert_eq!(seen[seen.len() - 2], "execution_result");
    }

    #[tokio::test]
    async fn test_run_cycle_reports_failure() {
        let mut agent = EchoAgent::new("echo");
        agent.fail_analysis = true;
        let orchestrator = orchestrator(agent);
        let session = SessionId::new("s");
        let mut events = orchestrator.connect(session.clone()).unwrap();

        let report = run_cycle(&orchestrator, &session, &mut events, "hi", &NoProgress)
            .await
            .unwrap();
        assert!(!report.is_success());
        assert_eq!(report.error.as_deref(), Some("no agent produced an analysis"));
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let orchestrator = orchestrator(EchoAgent::new("echo"));
        let session = SessionId::new("s");
        let mut events = orchestrator.connect(session.clone()).unwrap();

        let err = run_cycle(&orchestrator, &session, &mut events, "  ", &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CycleError::Orchestrator(OrchestratorError::EmptyMessage)
        ));
    }
}
