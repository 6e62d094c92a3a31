//! Consensus Selector
//!
//! Collects a proposal from every agent that is still error-free after the
//! discussion and picks one with the domain selection rule.

use crate::config::DiscussionConfig;
use crate::event_channel::EventPublisher;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::registry::AgentRegistry;
use crate::use_cases::discussion::active_agents;
use crate::use_cases::shared::{guarded_call, normalize_proposal};
use conclave_domain::{ConsensusResult, Session, SessionEvent, select_proposal};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub struct ConsensusSelector {
    registry: Arc<AgentRegistry>,
    config: DiscussionConfig,
    logger: Arc<dyn ConversationLogger>,
}

impl ConsensusSelector {
    pub fn new(
        registry: Arc<AgentRegistry>,
        config: DiscussionConfig,
        logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        Self {
            registry,
            config,
            logger,
        }
    }

    /// Gather proposals concurrently and select the winner.
    ///
    /// The outcome only depends on the proposals themselves and registration
    /// order, never on which proposal arrived first.
    pub async fn select(&self, session: &mut Session, events: &EventPublisher) -> ConsensusResult {
        let proposers = active_agents(session, &self.registry);
        info!(session = %session.id(), agents = proposers.len(), "Collecting proposals");

        let transcript = Arc::new(session.transcript());
        let mut join_set = JoinSet::new();

        for id in &proposers {
            let Some(agent) = self.registry.get(id) else {
                continue;
            };
            let agent = Arc::clone(agent);
            let transcript = Arc::clone(&transcript);
            let timeout = self.config.call_timeout;

            join_set.spawn(async move {
                let result = guarded_call(timeout, agent.propose(&transcript)).await;
                (agent.id().clone(), result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, result)) => {
                    let proposal = normalize_proposal(&id, result);
                    match &proposal.error {
                        Some(error) => warn!(agent = %id, "Proposal failed: {}", error),
                        None => info!(
                            agent = %id,
                            confidence = %proposal.confidence,
                            "Proposal received"
                        ),
                    }
                    self.logger.log(ConversationEvent::new(
                        "proposal_received",
                        session.id(),
                        json!({ "cycle": session.cycle(), "proposal": &proposal }),
                    ));
                    session.record_proposal(proposal);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        let result = select_proposal(session.proposals(), &self.registry.priority_order());
        match &result {
            ConsensusResult::Reached(winner) => {
                info!(session = %session.id(), agent = %winner.agent, "Consensus reached");
                self.logger.log(ConversationEvent::new(
                    "consensus_selected",
                    session.id(),
                    json!({ "cycle": session.cycle(), "winner": winner }),
                ));
                events.publish(SessionEvent::consensus_reached(winner.summary.clone()));
            }
            ConsensusResult::Failed { reason } => {
                warn!(session = %session.id(), "Consensus failed: {}", reason);
            }
        }
        result
    }
}
