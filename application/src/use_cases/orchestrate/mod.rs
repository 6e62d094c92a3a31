//! Orchestrator service
//!
//! Public entry point of the engine. Owns the session map, spawns one worker
//! per session and routes inbound messages to it.
//!
//! ```text
//! handle(id, msg) ──▶ session inbox ──▶ SessionWorker
//!                                         │  Analyzing → Discussing →
//!                                         │  ConsensusReached → Executing →
//!                                         │  Completed | Failed
//!                                         ▼
//! connect(id) ◀── EventSubscriber ◀── EventPublisher
//! ```

pub mod types;
mod worker;

pub use types::{AgentHealth, HealthReport, OrchestratorError, PhaseFailure};

use crate::config::DiscussionConfig;
use crate::event_channel::{EventPublisher, EventSubscriber, event_channel_with_teardown};
use crate::ports::conversation_logger::ConversationLogger;
use crate::registry::AgentRegistry;
use conclave_domain::{Session, SessionId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use worker::SessionWorker;

type SessionMap = Arc<Mutex<HashMap<SessionId, SessionHandle>>>;

/// Orchestrator-side view of a live session.
struct SessionHandle {
    inbox: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    events: EventPublisher,
    /// Handed out by the first `connect`
    subscriber: Option<EventSubscriber>,
    /// Distinguishes a re-created session from the one a worker belongs to
    generation: u64,
}

impl SessionHandle {
    fn teardown(&self) {
        self.cancel.cancel();
        self.events.close();
    }
}

/// Multi-session negotiation service.
///
/// Methods that may create a session spawn its worker and must be called from
/// within a Tokio runtime.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    config: DiscussionConfig,
    logger: Arc<dyn ConversationLogger>,
    sessions: SessionMap,
    shutdown: CancellationToken,
    generation: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        config: DiscussionConfig,
        logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        info!(
            agents = registry.len(),
            rounds = config.rounds,
            "Orchestrator ready"
        );
        Self {
            registry,
            config,
            logger,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DiscussionConfig {
        &self.config
    }

    /// Subscribe to a session's events, creating the session if needed.
    ///
    /// Each session has a single subscriber; a second call fails with
    /// [`OrchestratorError::AlreadySubscribed`]. Dropping the subscriber
    /// cancels the session like [`Orchestrator::disconnect`].
    pub fn connect(
        &self,
        session_id: impl Into<SessionId>,
    ) -> Result<EventSubscriber, OrchestratorError> {
        let session_id = session_id.into();
        self.ensure_running()?;
        let mut sessions = self.lock_sessions();
        let handle = self.ensure_session(&mut sessions, &session_id);
        let subscriber = handle
            .subscriber
            .take()
            .ok_or_else(|| OrchestratorError::AlreadySubscribed(session_id.clone()))?;
        debug!(session = %session_id, "Subscriber connected");
        Ok(subscriber)
    }

    /// Enqueue a message for the session and return immediately.
    ///
    /// Messages for one session are processed in arrival order, one cycle at
    /// a time.
    pub fn handle(
        &self,
        session_id: impl Into<SessionId>,
        message: impl Into<String>,
    ) -> Result<(), OrchestratorError> {
        let session_id = session_id.into();
        let message = message.into();
        if message.trim().is_empty() {
            return Err(OrchestratorError::EmptyMessage);
        }
        self.ensure_running()?;

        let mut sessions = self.lock_sessions();
        let handle = self.ensure_session(&mut sessions, &session_id);
        if let Err(mpsc::error::SendError(message)) = handle.inbox.send(message) {
            // The worker already stopped; start a fresh session under the same id
            debug!(session = %session_id, "Replacing stopped session");
            sessions.remove(&session_id);
            let handle = self.ensure_session(&mut sessions, &session_id);
            handle
                .inbox
                .send(message)
                .map_err(|_| OrchestratorError::SessionClosed(session_id.clone()))?;
        }
        debug!(session = %session_id, "Message queued");
        Ok(())
    }

    /// Cancel a session and drop it. Returns whether it existed.
    ///
    /// In-flight agent calls run to completion but their results are
    /// discarded and no further phase starts.
    pub fn disconnect(&self, session_id: &SessionId) -> bool {
        let removed = self.lock_sessions().remove(session_id);
        match removed {
            Some(handle) => {
                handle.teardown();
                info!(session = %session_id, "Session disconnected");
                true
            }
            None => false,
        }
    }

    /// Registered agents with their current status, plus live session count.
    pub fn health(&self) -> HealthReport {
        HealthReport {
            agents: self
                .registry
                .iter()
                .map(|agent| AgentHealth {
                    id: agent.id().clone(),
                    status: agent.status(),
                })
                .collect(),
            active_sessions: self.session_count(),
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Cancel every session. Later calls to `handle` and `connect` fail.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let mut sessions = self.lock_sessions();
        for handle in sessions.values() {
            handle.teardown();
        }
        info!(sessions = sessions.len(), "Orchestrator shut down");
        sessions.clear();
    }

    fn ensure_running(&self) -> Result<(), OrchestratorError> {
        if self.shutdown.is_cancelled() {
            return Err(OrchestratorError::ShutDown);
        }
        Ok(())
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_session<'m>(
        &self,
        sessions: &'m mut HashMap<SessionId, SessionHandle>,
        session_id: &SessionId,
    ) -> &'m mut SessionHandle {
        // A cancelled session is on its way out; its worker removes it shortly
        if sessions
            .get(session_id)
            .is_some_and(|handle| handle.cancel.is_cancelled())
        {
            debug!(session = %session_id, "Replacing cancelled session");
            sessions.remove(session_id);
        }
        sessions
            .entry(session_id.clone())
            .or_insert_with(|| self.spawn_session(session_id))
    }

    fn spawn_session(&self, session_id: &SessionId) -> SessionHandle {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let cancel = self.shutdown.child_token();
        let (events, subscriber) =
            event_channel_with_teardown(self.config.event_buffer, cancel.clone());
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let worker = SessionWorker {
            session: Session::new(session_id.clone()),
            generation,
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
            logger: Arc::clone(&self.logger),
            events: events.clone(),
            inbox: inbox_rx,
            cancel: cancel.clone(),
            sessions: Arc::clone(&self.sessions),
        };
        tokio::spawn(worker.run());
        info!(session = %session_id, "Session created");

        SessionHandle {
            inbox: inbox_tx,
            cancel,
            events,
            subscriber: Some(subscriber),
            generation,
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
