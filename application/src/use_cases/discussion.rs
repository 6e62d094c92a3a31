//! Discussion Coordinator
//!
//! Runs the Analyze phase (independent analyses, fanned out to every agent)
//! and the Discuss phase (sequential peer-review rounds among the agents that
//! are still error-free).

use crate::config::DiscussionConfig;
use crate::event_channel::EventPublisher;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::registry::AgentRegistry;
use crate::use_cases::orchestrate::types::PhaseFailure;
use crate::use_cases::shared::{
    check_cancelled, describe_response, guarded_call, normalize_response,
};
use conclave_domain::{
    AgentId, AgentResponse, DiscussionRound, ResponseKind, Session, SessionEvent, truncate,
};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Agents that analyzed successfully and have not erred in any round yet,
/// in registration order.
pub fn active_agents(session: &Session, registry: &AgentRegistry) -> Vec<AgentId> {
    let analyzed = session.analyzed_agents();
    registry
        .priority_order()
        .into_iter()
        .filter(|id| analyzed.contains(id))
        .filter(|id| {
            session
                .rounds()
                .iter()
                .all(|round| round.failed_agents().all(|failed| failed != id))
        })
        .collect()
}

pub struct DiscussionCoordinator {
    registry: Arc<AgentRegistry>,
    config: DiscussionConfig,
    logger: Arc<dyn ConversationLogger>,
    cancellation: Option<CancellationToken>,
}

impl DiscussionCoordinator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        config: DiscussionConfig,
        logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        Self {
            registry,
            config,
            logger,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Analyze phase: every registered agent analyzes the request concurrently.
    ///
    /// Results are recorded in arrival order. Fails only when no agent
    /// produced a successful analysis.
    pub async fn collect_initial(
        &self,
        session: &mut Session,
        events: &EventPublisher,
    ) -> Result<(), PhaseFailure> {
        check_cancelled(&self.cancellation)?;
        let request = session.request().unwrap_or_default().to_string();
        info!(
            session = %session.id(),
            agents = self.registry.len(),
            "Collecting initial analyses"
        );

        let mut join_set = JoinSet::new();
        for agent in self.registry.iter() {
            let agent = Arc::clone(agent);
            let request = request.clone();
            let timeout = self.config.call_timeout;

            join_set.spawn(async move {
                let result = guarded_call(timeout, agent.analyze(&request)).await;
                (agent.id().clone(), result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, result)) => {
                    let response = normalize_response(&id, ResponseKind::Analysis, result);
                    self.report(session, events, &response);
                    session.record_initial(response);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        if session.analyzed_agents().is_empty() {
            return Err(PhaseFailure::NoAnalysis);
        }
        Ok(())
    }

    /// Discuss phase: `rounds` sequential peer-review rounds.
    ///
    /// An agent that errs is not asked again, but its last good response
    /// stays visible to the others.
    pub async fn run_rounds(
        &self,
        session: &mut Session,
        events: &EventPublisher,
    ) -> Result<(), PhaseFailure> {
        let order = self.registry.priority_order();

        for index in 0..self.config.rounds {
            check_cancelled(&self.cancellation)?;

            let active = active_agents(session, &self.registry);
            if active.is_empty() {
                debug!(
                    session = %session.id(),
                    round = index,
                    "No active agents, skipping remaining rounds"
                );
                break;
            }
            info!(
                session = %session.id(),
                round = index,
                agents = active.len(),
                "Discussion round"
            );

            let transcript = session.transcript();
            let mut join_set = JoinSet::new();

            for id in &active {
                let Some(agent) = self.registry.get(id) else {
                    continue;
                };
                let peers: Vec<AgentResponse> = order
                    .iter()
                    .filter(|peer| *peer != id)
                    .filter_map(|peer| transcript.latest_for(peer).cloned())
                    .collect();

                let agent = Arc::clone(agent);
                let timeout = self.config.call_timeout;
                join_set.spawn(async move {
                    let result = guarded_call(timeout, agent.review(&peers, index)).await;
                    (agent.id().clone(), result)
                });
            }

            let mut round = DiscussionRound::new(index);
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((id, result)) => {
                        let response = normalize_response(&id, ResponseKind::Feedback, result)
                            .with_round(index);
                        if !response.is_success() {
                            debug!(agent = %id, round = index, "Agent dropped from discussion");
                        }
                        self.report(session, events, &response);
                        round.record(response);
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }
            session.record_round(round);
        }
        Ok(())
    }

    fn report(&self, session: &Session, events: &EventPublisher, response: &AgentResponse) {
        match &response.error {
            Some(error) => warn!(
                agent = %response.agent,
                kind = response.kind.as_str(),
                "Agent failed: {}",
                error
            ),
            None => {
                info!(agent = %response.agent, kind = response.kind.as_str(), "Agent responded");
                debug!(agent = %response.agent, "{}", truncate(&response.content, 120));
            }
        }
        events.publish(SessionEvent::agent_message(
            &response.agent,
            describe_response(response),
        ));
        self.logger.log(ConversationEvent::new(
            "agent_response",
            session.id(),
            json!({ "cycle": session.cycle(), "response": response }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_channel::{EventSubscriber, event_channel};
    use crate::ports::agent_adapter::AgentError;
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::testing::{Outcome, ScriptedAgent};
    use std::time::Duration;

    fn coordinator(registry: AgentRegistry, rounds: usize) -> DiscussionCoordinator {
        DiscussionCoordinator::new(
            Arc::new(registry),
            DiscussionConfig::default()
                .with_rounds(rounds)
                .with_call_timeout(Duration::from_secs(1)),
            Arc::new(NoConversationLogger),
        )
    }

    fn started(request: &str) -> Session {
        let mut session = Session::new("s1");
        session.begin_cycle(request).unwrap();
        session
    }

    fn drain(subscriber: &mut EventSubscriber) -> Vec<SessionEvent> {
        std::iter::from_fn(|| subscriber.try_recv().ok()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_results_recorded_in_arrival_order() {
        let slow = ScriptedAgent::new("slow").latency(Duration::from_millis(300));
        let fast = ScriptedAgent::new("fast").latency(Duration::from_millis(10));
        let mut registry = AgentRegistry::new();
        registry.register(slow.into_arc()).unwrap();
        registry.register(fast.into_arc()).unwrap();

        let (publisher, mut subscriber) = event_channel(16);
        let mut session = started("plan a launch");
        coordinator(registry, 0)
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();

        let order: Vec<_> = session
            .initial_responses()
            .iter()
            .map(|r| r.agent.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["fast", "slow"]);
        assert_eq!(drain(&mut subscriber).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_failure_form_is_an_error_record() {
        let mut registry = AgentRegistry::new();
        registry
            .register(
                ScriptedAgent::new("err")
                    .analyze(Outcome::Err(AgentError::Unavailable("down".into())))
                    .into_arc(),
            )
            .unwrap();
        registry
            .register(
                ScriptedAgent::new("tagged")
                    .analyze(Outcome::Tagged("bad input".into()))
                    .into_arc(),
            )
            .unwrap();
        registry
            .register(ScriptedAgent::new("hang").analyze(Outcome::Hang).into_arc())
            .unwrap();
        registry
            .register(ScriptedAgent::new("panic").analyze(Outcome::Panic).into_arc())
            .unwrap();
        registry
            .register(ScriptedAgent::new("ok").into_arc())
            .unwrap();

        let (publisher, mut subscriber) = event_channel(16);
        let mut session = started("anything");
        coordinator(registry, 0)
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();

        let responses = session.initial_responses();
        assert_eq!(responses.len(), 5);
        let failed: Vec<_> = responses.iter().filter(|r| !r.is_success()).collect();
        assert_eq!(failed.len(), 4);
        assert_eq!(session.analyzed_agents(), vec![AgentId::new("ok")]);

        // Failures are published too
        let events = drain(&mut subscriber);
        assert_eq!(events.len(), 5);
        let failure_messages = events
            .iter()
            .filter(|e| {
                matches!(e, SessionEvent::AgentMessage { text, .. } if text.contains("failed"))
            })
            .count();
        assert_eq!(failure_messages, 4);
    }

    #[tokio::test]
    async fn test_all_analyses_failing_fails_phase() {
        let mut registry = AgentRegistry::new();
        registry
            .register(ScriptedAgent::new("a").analyze(Outcome::Tagged("no".into())).into_arc())
            .unwrap();
        registry
            .register(
                ScriptedAgent::new("b")
                    .analyze(Outcome::Err(AgentError::RequestFailed("no".into())))
                    .into_arc(),
            )
            .unwrap();

        let (publisher, _subscriber) = event_channel(16);
        let mut session = started("anything");
        let err = coordinator(registry, 0)
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap_err();
        assert_eq!(err, PhaseFailure::NoAnalysis);
        assert_eq!(err.to_string(), "no agent produced an analysis");
    }

    #[tokio::test]
    async fn test_records_are_attributed_to_called_agent() {
        let mut registry = AgentRegistry::new();
        registry
            .register(ScriptedAgent::new("honest").claiming("someone-else").into_arc())
            .unwrap();

        let (publisher, _subscriber) = event_channel(16);
        let mut session = started("anything");
        coordinator(registry, 0)
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();
        assert_eq!(session.initial_responses()[0].agent, AgentId::new("honest"));
    }

    #[tokio::test]
    async fn test_round_error_excludes_agent_but_keeps_last_good_response() {
        let a = ScriptedAgent::new("a").into_arc();
        let b = ScriptedAgent::new("b")
            .review(0, Outcome::Err(AgentError::RequestFailed("crash".into())))
            .into_arc();
        let c = ScriptedAgent::new("c").into_arc();
        let mut registry = AgentRegistry::new();
        registry.register(a.clone()).unwrap();
        registry.register(b.clone()).unwrap();
        registry.register(c.clone()).unwrap();

        let (publisher, _subscriber) = event_channel(64);
        let mut session = started("design an api");
        let coordinator = coordinator(registry, 2);
        coordinator
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();
        coordinator.run_rounds(&mut session, &publisher).await.unwrap();

        assert_eq!(session.rounds().len(), 2);
        assert_eq!(session.rounds()[0].responses.len(), 3);
        assert_eq!(session.rounds()[1].responses.len(), 2);
        assert!(session.rounds()[1].get(&AgentId::new("b")).is_none());
        assert_eq!(b.calls(), vec!["analyze", "review:0"]);

        // In round 1, a still sees b's initial analysis
        let seen = a.reviews_seen();
        let (round, peers) = &seen[1];
        assert_eq!(*round, 1);
        let b_visible = peers
            .iter()
            .find(|r| r.agent == AgentId::new("b"))
            .expect("b remains visible");
        assert_eq!(b_visible.kind, ResponseKind::Analysis);
        // while c's latest is its round-0 feedback
        let c_visible = peers.iter().find(|r| r.agent == AgentId::new("c")).unwrap();
        assert_eq!(c_visible.round, Some(0));

        assert_eq!(
            active_agents(&session, &coordinator.registry),
            vec![AgentId::new("a"), AgentId::new("c")]
        );
    }

    #[tokio::test]
    async fn test_agent_never_reviews_itself() {
        let a = ScriptedAgent::new("a").into_arc();
        let b = ScriptedAgent::new("b").into_arc();
        let mut registry = AgentRegistry::new();
        registry.register(a.clone()).unwrap();
        registry.register(b.clone()).unwrap();

        let (publisher, _subscriber) = event_channel(64);
        let mut session = started("anything");
        let coordinator = coordinator(registry, 1);
        coordinator
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();
        coordinator.run_rounds(&mut session, &publisher).await.unwrap();

        let (_, peers) = &a.reviews_seen()[0];
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].agent, AgentId::new("b"));
    }

    #[tokio::test]
    async fn test_single_agent_reviews_with_no_peers() {
        let solo = ScriptedAgent::new("solo").into_arc();
        let mut registry = AgentRegistry::new();
        registry.register(solo.clone()).unwrap();

        let (publisher, _subscriber) = event_channel(64);
        let mut session = started("anything");
        let coordinator = coordinator(registry, 2);
        coordinator
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();
        coordinator.run_rounds(&mut session, &publisher).await.unwrap();

        assert_eq!(session.rounds().len(), 2);
        assert!(solo.reviews_seen().iter().all(|(_, peers)| peers.is_empty()));
    }

    #[tokio::test]
    async fn test_rounds_stop_when_nobody_is_active() {
        let a = ScriptedAgent::new("a")
            .review(0, Outcome::Tagged("gave up".into()))
            .into_arc();
        let mut registry = AgentRegistry::new();
        registry.register(a.clone()).unwrap();

        let (publisher, _subscriber) = event_channel(64);
        let mut session = started("anything");
        let coordinator = coordinator(registry, 3);
        coordinator
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();
        coordinator.run_rounds(&mut session, &publisher).await.unwrap();

        assert_eq!(session.rounds().len(), 1);
        assert_eq!(a.calls(), vec!["analyze", "review:0"]);
    }

    #[tokio::test]
    async fn test_cancelled_before_round() {
        let mut registry = AgentRegistry::new();
        registry.register(ScriptedAgent::new("a").into_arc()).unwrap();
        let token = CancellationToken::new();
        let coordinator = coordinator(registry, 2).with_cancellation(token.clone());

        let (publisher, _subscriber) = event_channel(64);
        let mut session = started("anything");
        coordinator
            .collect_initial(&mut session, &publisher)
            .await
            .unwrap();
        token.cancel();
        let err = coordinator
            .run_rounds(&mut session, &publisher)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(session.rounds().is_empty());
    }
}
