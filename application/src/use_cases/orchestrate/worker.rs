//! Session worker: runs one session's negotiation cycles.
//!
//! Each session owns exactly one worker task. The worker consumes the
//! session's inbox one message at a time, so a message that arrives while a
//! cycle is in flight simply waits for the next one.
//!
//! The worker stops once its session is cancelled. That happens on
//! `disconnect`, on shutdown and when the subscriber is dropped.

use super::{SessionHandle, SessionMap};
use super::types::PhaseFailure;
use crate::config::DiscussionConfig;
use crate::event_channel::EventPublisher;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::registry::AgentRegistry;
use crate::use_cases::consensus::ConsensusSelector;
use crate::use_cases::discussion::DiscussionCoordinator;
use crate::use_cases::execution::ExecutionDispatcher;
use conclave_domain::{
    ConsensusResult, ExecutionResult, Phase, Session, SessionEvent, SessionId,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(super) struct SessionWorker {
    pub(super) session: Session,
    pub(super) generation: u64,
    pub(super) registry: Arc<AgentRegistry>,
    pub(super) config: DiscussionConfig,
    pub(super) logger: Arc<dyn ConversationLogger>,
    pub(super) events: EventPublisher,
    pub(super) inbox: mpsc::UnboundedReceiver<String>,
    pub(super) cancel: CancellationToken,
    pub(super) sessions: SessionMap,
}

enum Retirement {
    Retired,
    Pending(String),
}

impl SessionWorker {
    pub(super) async fn run(mut self) {
        debug!(session = %self.session.id(), "Session worker started");

        loop {
            let idle = self.config.idle_timeout;
            let cancel = &self.cancel;
            let inbox = &mut self.inbox;
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.forget();
                    break;
                }
                received = async {
                    match idle {
                        Some(idle) => tokio::time::timeout(idle, inbox.recv()).await.ok(),
                        None => Some(inbox.recv().await),
                    }
                } => received,
            };

            match received {
                Some(Some(message)) => self.process(message).await,
                // Every sender is gone: the session was removed
                Some(None) => break,
                None => match self.retire() {
                    Retirement::Retired => break,
                    Retirement::Pending(message) => self.process(message).await,
                },
            }
        }

        self.events.close();
        debug!(session = %self.session.id(), "Session worker stopped");
    }

    /// Remove this session from the map unless a message slipped in.
    ///
    /// Senders only enqueue while holding the map lock, so an empty inbox
    /// checked under the lock stays empty until the entry is gone.
    fn retire(&mut self) -> Retirement {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(message) = self.inbox.try_recv() {
            return Retirement::Pending(message);
        }
        self.remove_entry(&mut sessions);
        info!(session = %self.session.id(), "Session retired after idle timeout");
        Retirement::Retired
    }

    /// Drop the map entry of a cancelled session.
    fn forget(&self) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if self.remove_entry(&mut sessions) {
            debug!(session = %self.session.id(), "Cancelled session removed");
        }
    }

    /// Only the entry this worker was spawned for; the id may be reused.
    fn remove_entry(&self, sessions: &mut HashMap<SessionId, SessionHandle>) -> bool {
        let id = self.session.id();
        let owned = sessions
            .get(id)
            .is_some_and(|handle| handle.generation == self.generation);
        if owned {
            sessions.remove(id);
        }
        owned
    }

    async fn process(&mut self, message: String) {
        if let Err(e) = self.session.begin_cycle(message) {
            warn!(session = %self.session.id(), "Cannot start cycle: {}", e);
            self.events.publish(SessionEvent::error(e.to_string()));
            return;
        }
        let session_id = self.session.id().clone();
        let cycle = self.session.cycle();
        info!(session = %session_id, cycle, "Cycle started");
        self.logger.log(ConversationEvent::new(
            "cycle_started",
            &session_id,
            json!({ "cycle": cycle, "request": self.session.request() }),
        ));

        match self.run_cycle().await {
            Ok(result) => {
                info!(
                    session = %session_id,
                    cycle,
                    status = %result.status,
                    "Cycle completed"
                );
                self.logger.log(ConversationEvent::new(
                    "cycle_finished",
                    &session_id,
                    json!({
                        "cycle": cycle,
                        "phase": Phase::Completed,
                        "status": result.status,
                    }),
                ));
                self.events.publish(SessionEvent::execution_result(result));
            }
            Err(failure) if failure.is_cancelled() => {
                debug!(session = %session_id, cycle, "Cycle abandoned after cancellation");
                // Results of in-flight calls are discarded
                if let Err(e) = self.session.fail(failure.to_string()) {
                    debug!(session = %session_id, "Cancelled session not marked failed: {}", e);
                }
            }
            Err(failure) => {
                let reason = failure.to_string();
                warn!(
                    session = %session_id,
                    cycle,
                    phase = %self.session.phase(),
                    "Cycle failed: {}",
                    reason
                );
                if let Err(e) = self.session.fail(reason.clone()) {
                    warn!(session = %session_id, "Could not mark session failed: {}", e);
                }
                self.logger.log(ConversationEvent::new(
                    "cycle_finished",
                    &session_id,
                    json!({ "cycle": cycle, "phase": Phase::Failed, "reason": &reason }),
                ));
                self.events.publish(SessionEvent::error(reason));
            }
        }
    }

    async fn run_cycle(&mut self) -> Result<ExecutionResult, PhaseFailure> {
        let discussion = DiscussionCoordinator::new(
            Arc::clone(&self.registry),
            self.config.clone(),
            Arc::clone(&self.logger),
        )
        .with_cancellation(self.cancel.clone());

        // Phase 1: Analyze
        self.enter(Phase::Analyzing, format!("{} agents analyzing", self.registry.len()))?;
        discussion
            .collect_initial(&mut self.session, &self.events)
            .await?;

        // Phase 2: Discuss
        self.enter(Phase::Discussing, format!("{} review rounds", self.config.rounds))?;
        discussion
            .run_rounds(&mut self.session, &self.events)
            .await?;

        // Phase 3: Consensus
        self.enter(Phase::ConsensusReached, "collecting proposals")?;
        let selector = ConsensusSelector::new(
            Arc::clone(&self.registry),
            self.config.clone(),
            Arc::clone(&self.logger),
        );
        let proposal = match selector.select(&mut self.session, &self.events).await {
            ConsensusResult::Reached(proposal) => proposal,
            ConsensusResult::Failed { reason } => return Err(PhaseFailure::NoProposal(reason)),
        };

        // Phase 4: Execute
        self.enter(
            Phase::Executing,
            format!("executor {}, {} steps", proposal.executor, proposal.workflow.len()),
        )?;
        let dispatcher = ExecutionDispatcher::new(Arc::clone(&self.registry), self.config.clone());
        let result = dispatcher.execute(&proposal).await;
        for outcome in &result.outcomes {
            self.logger.log(ConversationEvent::new(
                "step_executed",
                self.session.id(),
                json!({ "cycle": self.session.cycle(), "outcome": outcome }),
            ));
        }

        self.enter(Phase::Completed, result.status.as_str())?;
        Ok(result)
    }

    /// Move to `phase` and announce it, unless the session was cancelled or
    /// its event channel torn down.
    fn enter(&mut self, phase: Phase, note: impl Into<String>) -> Result<(), PhaseFailure> {
        if self.cancel.is_cancelled() || self.events.is_closed() {
            return Err(PhaseFailure::Cancelled);
        }
        self.session.transition(phase)?;
        debug!(session = %self.session.id(), phase = %phase, "Phase entered");
        self.events.publish(SessionEvent::phase_update(phase, note));
        Ok(())
    }
}
