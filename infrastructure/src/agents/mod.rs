//! Agent adapters shipped with conclave.
//!
//! [`ProfileAgent`] implements the application's
//! [`AgentAdapter`](conclave_application::AgentAdapter) port from a
//! declarative [`AgentProfile`]. Two built-in profiles (`planner`,
//! `executor`) are available as presets.

pub mod builtin;
mod profile;
mod profile_agent;

pub use profile::{AgentProfile, FeedbackRule, KeywordRule, PlanTemplate, StepResult, StepTemplate};
pub use profile_agent::ProfileAgent;

use conclave_application::{AgentRegistry, RegistryError};
use std::sync::Arc;

/// Register one [`ProfileAgent`] per profile, in order.
pub fn build_registry(
    profiles: impl IntoIterator<Item = AgentProfile>,
) -> Result<AgentRegistry, RegistryError> {
    let mut registry = AgentRegistry::new();
    for profile in profiles {
        registry.register(Arc::new(ProfileAgent::new(profile)))?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_keeps_order() {
        let registry = build_registry(builtin::default_profiles()).unwrap();
        let ids: Vec<_> = registry
            .priority_order()
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["planner", "executor"]);
    }

    #[test]
    fn test_build_registry_rejects_duplicates() {
        let result = build_registry(vec![builtin::planner(), builtin::planner()]);
        assert!(matches!(result, Err(RegistryError::Duplicate(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_builtin_pair_negotiates_shared_plan() {
        use conclave_application::{DiscussionConfig, NoConversationLogger, Orchestrator};
        use conclave_domain::{ExecutionStatus, Executor, SessionEvent};

        let registry = Arc::new(build_registry(builtin::default_profiles()).unwrap());
        let orchestrator = Orchestrator::new(
            registry,
            DiscussionConfig::default(),
            Arc::new(NoConversationLogger),
        );
        let mut events = orchestrator.connect("demo").unwrap();
        orchestrator.handle("demo", "build a landing page").unwrap();

        let mut last = None;
        while let Some(event) = events.recv().await {
            let terminal = event.is_terminal();
            last = Some(event);
            if terminal {
                break;
            }
        }

        match last {
            Some(SessionEvent::ExecutionResult { result }) => {
                assert_eq!(result.executor, Executor::All);
                assert_eq!(result.status, ExecutionStatus::Success);
                assert_eq!(result.outcomes.len(), 4);
                assert!(result.summary.starts_with("Planner and executor"));
            }
            other => panic!("expected execution result, got {other:?}"),
        }
    }
}
