//! Scripted agents for use case tests.

use crate::ports::agent_adapter::{AgentAdapter, AgentError};
use async_trait::async_trait;
use conclave_domain::{
    AgentId, AgentResponse, AgentStatus, DiscussionTranscript, Executor, Proposal, ResponseKind,
    WorkflowStep,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// How a scripted call ends.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Ok,
    /// Return `Err(AgentError)`
    Err(AgentError),
    /// Return `Ok` with an error-tagged payload
    Tagged(String),
    Panic,
    /// Never complete
    Hang,
}

/// Mock adapter whose every answer is configured up front.
pub(crate) struct ScriptedAgent {
    id: AgentId,
    /// Id written into returned records (tests re-attribution)
    claimed_id: Option<AgentId>,
    confidence: f64,
    analyze: Outcome,
    reviews: HashMap<usize, Outcome>,
    propose: Outcome,
    proposal_confidence: f64,
    executor: Executor,
    steps: Vec<WorkflowStep>,
    hints: Vec<(String, String)>,
    failing_steps: HashSet<usize>,
    latency: Duration,
    step_latency: HashMap<usize, Duration>,
    calls: Mutex<Vec<String>>,
    reviews_seen: Mutex<Vec<(usize, Vec<AgentResponse>)>>,
    transcripts_seen: Mutex<Vec<DiscussionTranscript>>,
    steps_seen: Mutex<Vec<WorkflowStep>>,
    /// Start and end of each executed step
    step_spans: Mutex<Vec<(usize, Instant, Instant)>>,
}

impl ScriptedAgent {
    pub(crate) fn new(id: &str) -> Self {
        let id = AgentId::new(id);
        Self {
            executor: Executor::Agent(id.clone()),
            id,
            claimed_id: None,
            confidence: 0.8,
            analyze: Outcome::Ok,
            reviews: HashMap::new(),
            propose: Outcome::Ok,
            proposal_confidence: 0.5,
            steps: Vec::new(),
            hints: Vec::new(),
            failing_steps: HashSet::new(),
            latency: Duration::ZERO,
            step_latency: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            reviews_seen: Mutex::new(Vec::new()),
            transcripts_seen: Mutex::new(Vec::new()),
            steps_seen: Mutex::new(Vec::new()),
            step_spans: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn analyze(mut self, outcome: Outcome) -> Self {
        self.analyze = outcome;
        self
    }

    pub(crate) fn review(mut self, round: usize, outcome: Outcome) -> Self {
        self.reviews.insert(round, outcome);
        self
    }

    pub(crate) fn propose(mut self, outcome: Outcome) -> Self {
        self.propose = outcome;
        self
    }

    pub(crate) fn proposal(
        mut self,
        confidence: f64,
        executor: impl Into<Executor>,
        steps: Vec<WorkflowStep>,
    ) -> Self {
        self.proposal_confidence = confidence;
        self.executor = executor.into();
        self.steps = steps;
        self
    }

    pub(crate) fn hint(mut self, key: &str, value: &str) -> Self {
        self.hints.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn failing_step(mut self, index: usize) -> Self {
        self.failing_steps.insert(index);
        self
    }

    pub(crate) fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn step_latency(mut self, index: usize, latency: Duration) -> Self {
        self.step_latency.insert(index, latency);
        self
    }

    pub(crate) fn claiming(mut self, id: &str) -> Self {
        self.claimed_id = Some(AgentId::new(id));
        self
    }

    pub(crate) fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn reviews_seen(&self) -> Vec<(usize, Vec<AgentResponse>)> {
        self.reviews_seen.lock().unwrap().clone()
    }

    pub(crate) fn transcripts_seen(&self) -> Vec<DiscussionTranscript> {
        self.transcripts_seen.lock().unwrap().clone()
    }

    pub(crate) fn steps_seen(&self) -> Vec<WorkflowStep> {
        self.steps_seen.lock().unwrap().clone()
    }

    pub(crate) fn step_span(&self, index: usize) -> Option<(Instant, Instant)> {
        self.step_spans
            .lock()
            .unwrap()
            .iter()
            .find(|(i, _, _)| *i == index)
            .map(|(_, start, end)| (*start, *end))
    }

    fn author(&self) -> AgentId {
        self.claimed_id.clone().unwrap_or_else(|| self.id.clone())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn play<T>(
        &self,
        outcome: &Outcome,
        ok: T,
        tagged: impl FnOnce(String) -> T,
    ) -> Result<T, AgentError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match outcome {
            Outcome::Ok => Ok(ok),
            Outcome::Err(e) => Err(e.clone()),
            Outcome::Tagged(msg) => Ok(tagged(msg.clone())),
            Outcome::Panic => panic!("scripted panic in {}", self.id),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl AgentAdapter for ScriptedAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    async fn analyze(&self, request: &str) -> Result<AgentResponse, AgentError> {
        self.record("analyze".to_string());
        let mut response = AgentResponse::analysis(
            self.author(),
            format!("{} analysis of '{}'", self.id, request),
            self.confidence,
        );
        for (key, value) in &self.hints {
            response = response.with_hint(key.clone(), value.clone());
        }
        let author = self.author();
        self.play(&self.analyze, response, |e| {
            AgentResponse::failure(author, ResponseKind::Analysis, e)
        })
        .await
    }

    async fn review(
        &self,
        peers: &[AgentResponse],
        round: usize,
    ) -> Result<AgentResponse, AgentError> {
        self.record(format!("review:{round}"));
        self.reviews_seen
            .lock()
            .unwrap()
            .push((round, peers.to_vec()));
        let outcome = self.reviews.get(&round).cloned().unwrap_or(Outcome::Ok);
        let response = AgentResponse::feedback(
            self.author(),
            round,
            format!("{} reviewed {} peers", self.id, peers.len()),
            0.9,
        );
        let author = self.author();
        self.play(&outcome, response, |e| {
            AgentResponse::failure(author, ResponseKind::Feedback, e)
        })
        .await
    }

    async fn propose(&self, transcript: &DiscussionTranscript) -> Result<Proposal, AgentError> {
        self.record("propose".to_string());
        self.transcripts_seen
            .lock()
            .unwrap()
            .push(transcript.clone());
        let proposal = Proposal::new(
            self.author(),
            format!("plan from {}", self.id),
            self.proposal_confidence,
            self.executor.clone(),
        )
        .with_steps(self.steps.clone());
        let author = self.author();
        self.play(&self.propose, proposal, |e| Proposal::failure(author, e))
            .await
    }

    async fn execute_step(&self, step: &WorkflowStep) -> Result<String, AgentError> {
        self.record(format!("step:{}", step.index));
        let started = Instant::now();
        if let Some(latency) = self.step_latency.get(&step.index) {
            tokio::time::sleep(*latency).await;
        }
        self.step_spans
            .lock()
            .unwrap()
            .push((step.index, started, Instant::now()));
        self.steps_seen.lock().unwrap().push(step.clone());
        if self.failing_steps.contains(&step.index) {
            return Err(AgentError::RequestFailed(format!(
                "step {} rejected",
                step.index
            )));
        }
        Ok(format!("{} did '{}'", self.id, step.action))
    }

    fn status(&self) -> AgentStatus {
        AgentStatus::active(self.id.as_str()).with_capabilities(vec!["scripted".to_string()])
    }
}
