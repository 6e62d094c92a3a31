//! [`AgentAdapter`] implementation driven by an [`AgentProfile`].
//!
//! The agent is deterministic: the same request and transcript always yield
//! the same analysis, feedback and proposal. It keeps no per-session state,
//! so one instance serves every session concurrently.

use super::profile::{AgentProfile, FeedbackRule, PlanTemplate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use conclave_application::{AgentAdapter, AgentError};
use conclave_domain::{
    AgentId, AgentResponse, AgentStatus, DiscussionTranscript, Executor, Proposal, WorkflowStep,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Collaboration score assumed before an agent has given any feedback.
const NEUTRAL_COLLABORATION: f64 = 0.5;

pub struct ProfileAgent {
    profile: AgentProfile,
    in_flight: AtomicUsize,
    last_activity: Mutex<Option<DateTime<Utc>>>,
}

/// Counts a call as in flight until dropped, including when the caller
/// abandons it on timeout.
struct CallGuard<'a>(&'a AtomicUsize);

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl ProfileAgent {
    pub fn new(profile: AgentProfile) -> Self {
        Self {
            profile,
            in_flight: AtomicUsize::new(0),
            last_activity: Mutex::new(None),
        }
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    async fn begin_call(&self) -> CallGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        let guard = CallGuard(&self.in_flight);
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
        if !self.profile.latency.is_zero() {
            tokio::time::sleep(self.profile.latency).await;
        }
        guard
    }

    fn approach_key(agent: &AgentId) -> String {
        format!("{agent}.approach")
    }

    fn tools_key(agent: &AgentId) -> String {
        format!("{agent}.tools")
    }

    /// Approach, tools and suggestions a peer's response exposes.
    fn traits_of(peer: &AgentResponse) -> Vec<&str> {
        let mut traits: Vec<&str> = Vec::new();
        if let Some(approach) = peer.hints.get(&Self::approach_key(&peer.agent)) {
            traits.push(approach);
        }
        if let Some(tools) = peer.hints.get(&Self::tools_key(&peer.agent)) {
            traits.extend(tools.split(',').filter(|t| !t.is_empty()));
        }
        traits.extend(peer.suggestions.iter().map(String::as_str));
        traits
    }

    /// First feedback rule (in profile order) that any peer triggers.
    fn feedback_rule(&self, peers: &[AgentResponse]) -> &FeedbackRule {
        if peers.is_empty() {
            return &self.profile.solo_feedback;
        }
        self.profile
            .feedback
            .iter()
            .find(|rule| {
                peers
                    .iter()
                    .any(|peer| Self::traits_of(peer).contains(&rule.when.as_str()))
            })
            .unwrap_or(&self.profile.default_feedback)
    }

    fn build_proposal(
        &self,
        template: &PlanTemplate,
        executor: Executor,
        request: &str,
    ) -> Proposal {
        let steps = template
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let actor = step
                    .actor
                    .as_deref()
                    .map(AgentId::new)
                    .unwrap_or_else(|| self.profile.id.clone());
                let workflow_step = WorkflowStep::new(i + 1, actor, step.action.clone());
                if step.independent {
                    workflow_step.independent()
                } else {
                    workflow_step
                }
            })
            .collect();

        let mut proposal = Proposal::new(
            self.profile.id.clone(),
            template.summary.replace("{request}", request),
            template.confidence,
            executor,
        )
        .with_steps(steps);
        if let Some(estimate) = &template.estimated_time {
            proposal = proposal.with_estimated_time(estimate.clone());
        }
        proposal
    }
}

#[async_trait]
impl AgentAdapter for ProfileAgent {
    fn id(&self) -> &AgentId {
        &self.profile.id
    }

    async fn analyze(&self, request: &str) -> Result<AgentResponse, AgentError> {
        let _call = self.begin_call().await;
        let rule = self.profile.rule_for(request);
        debug!(agent = %self.profile.id, approach = %rule.approach, "Analysis");

        Ok(AgentResponse::analysis(
            self.profile.id.clone(),
            rule.analysis.replace("{message}", request),
            rule.confidence,
        )
        .with_suggestions(rule.tools.clone())
        .with_hint(Self::approach_key(&self.profile.id), rule.approach.clone())
        .with_hint(Self::tools_key(&self.profile.id), rule.tools.join(",")))
    }

    async fn review(
        &self,
        peers: &[AgentResponse],
        round: usize,
    ) -> Result<AgentResponse, AgentError> {
        let _call = self.begin_call().await;
        let rule = self.feedback_rule(peers);
        let names = peers
            .iter()
            .map(|p| p.agent.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        debug!(agent = %self.profile.id, round, score = rule.score, "Feedback");

        Ok(AgentResponse::feedback(
            self.profile.id.clone(),
            round,
            rule.feedback.replace("{peers}", &names),
            rule.score,
        )
        .with_suggestions(rule.suggestions.clone()))
    }

    async fn propose(&self, transcript: &DiscussionTranscript) -> Result<Proposal, AgentError> {
        let _call = self.begin_call().await;
        let collaboration = transcript
            .average_feedback_score(&self.profile.id)
            .unwrap_or(NEUTRAL_COLLABORATION);

        let proposal = if collaboration > self.profile.collaboration_threshold {
            self.build_proposal(
                &self.profile.collaborative_plan,
                Executor::All,
                &transcript.request,
            )
        } else {
            self.build_proposal(
                &self.profile.solo_plan,
                Executor::Agent(self.profile.id.clone()),
                &transcript.request,
            )
        };
        debug!(
            agent = %self.profile.id,
            collaboration,
            executor = %proposal.executor,
            "Proposal"
        );
        Ok(proposal)
    }

    async fn execute_step(&self, step: &WorkflowStep) -> Result<String, AgentError> {
        let _call = self.begin_call().await;
        if step.action.trim().is_empty() {
            return Err(AgentError::RequestFailed(format!(
                "step {} has no action",
                step.index
            )));
        }
        Ok(self.profile.step_output(&step.action))
    }

    fn status(&self) -> AgentStatus {
        let in_flight = self.in_flight.load(Ordering::Relaxed);
        let mut status = AgentStatus::active(self.profile.name.clone())
            .with_capabilities(self.profile.capabilities.clone())
            .with_load(in_flight as f64 / self.profile.concurrency.max(1) as f64);
        let last = *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = last {
            status = status.with_last_activity(last.to_rfc3339());
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::builtin;
    use conclave_domain::{DiscussionRound, ResponseKind};

    fn agent(profile: AgentProfile) -> ProfileAgent {
        ProfileAgent::new(AgentProfile {
            latency: std::time::Duration::ZERO,
            ..profile
        })
    }

    #[tokio::test]
    async fn test_analysis_exposes_approach_hints() {
        let planner = agent(builtin::planner());
        let response = planner.analyze("search for rust crates").await.unwrap();

        assert_eq!(response.kind, ResponseKind::Analysis);
        assert_eq!(response.confidence.value(), 0.9);
        assert!(response.content.contains("search for rust crates"));
        assert_eq!(
            response.hints.get("planner.approach").map(String::as_str),
            Some("web_research")
        );
        assert_eq!(
            response.hints.get("planner.tools").map(String::as_str),
            Some("web_search,data_analysis")
        );
    }

    #[tokio::test]
    async fn test_feedback_reacts_to_peer_approach() {
        let planner = agent(builtin::planner());
        let executor = agent(builtin::executor());
        let peer = executor.analyze("list the files").await.unwrap();

        let feedback = planner.review(&[peer], 0).await.unwrap();
        assert_eq!(feedback.kind, ResponseKind::Feedback);
        assert_eq!(feedback.round, Some(0));
        assert_eq!(feedback.confidence.value(), 0.9);
        assert!(feedback.content.contains("executor"));
    }

    #[tokio::test]
    async fn test_feedback_without_peers_is_solo() {
        let planner = agent(builtin::planner());
        let feedback = planner.review(&[], 1).await.unwrap();
        assert_eq!(feedback.confidence.value(), 0.3);
        assert!(feedback.suggestions.contains(&"solo_execution".to_string()));
    }

    fn transcript_with_scores(agent: &str, scores: &[f64]) -> DiscussionTranscript {
        let mut transcript = DiscussionTranscript {
            request: "tidy the repo".to_string(),
            ..Default::default()
        };
        for (i, score) in scores.iter().enumerate() {
            let mut round = DiscussionRound::new(i);
            round.record(AgentResponse::feedback(agent, i, "ok", *score));
            transcript.rounds.push(round);
        }
        transcript
    }

    #[tokio::test]
    async fn test_high_collaboration_proposes_shared_plan() {
        let planner = agent(builtin::planner());
        let proposal = planner
            .propose(&transcript_with_scores("planner", &[0.9, 0.85]))
            .await
            .unwrap();

        assert_eq!(proposal.executor, Executor::All);
        assert!(proposal.summary.contains("tidy the repo"));
        assert_eq!(proposal.workflow.len(), 4);
        assert_eq!(proposal.workflow[2].actor, AgentId::new("executor"));
        assert_eq!(proposal.estimated_time.as_deref(), Some("3-5 min"));
    }

    #[tokio::test]
    async fn test_low_collaboration_proposes_solo_plan() {
        let planner = agent(builtin::planner());
        let proposal = planner
            .propose(&transcript_with_scores("planner", &[0.3, 0.75]))
            .await
            .unwrap();

        assert_eq!(proposal.executor, Executor::Agent(AgentId::new("planner")));
        assert!(proposal.workflow.iter().all(|s| s.actor == AgentId::new("planner")));
        assert_eq!(proposal.confidence.value(), 0.8);
    }

    #[tokio::test]
    async fn test_no_feedback_is_neutral() {
        let executor = agent(builtin::executor());
        let proposal = executor
            .propose(&DiscussionTranscript::default())
            .await
            .unwrap();
        assert_eq!(proposal.executor, Executor::Agent(AgentId::new("executor")));
    }

    #[tokio::test]
    async fn test_execute_step_and_status() {
        let executor = agent(builtin::executor());
        assert!(executor.status().last_activity.is_none());

        let output = executor
            .execute_step(&WorkflowStep::new(1, "executor", "Run the commands"))
            .await
            .unwrap();
        assert_eq!(output, "Commands ran successfully.");

        let status = executor.status();
        assert_eq!(status.name, "System Executor");
        assert!(status.is_active());
        assert!(status.last_activity.is_some());
        assert_eq!(status.load, Some(0.0));

        let err = executor
            .execute_step(&WorkflowStep::new(2, "executor", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::RequestFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_call_releases_load() {
        let slow = ProfileAgent::new(AgentProfile {
            latency: std::time::Duration::from_secs(5),
            ..AgentProfile::generic("slow")
        });
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(10), slow.analyze("x")).await;
        assert!(timed_out.is_err());
        assert_eq!(slow.status().load, Some(0.0));
    }
}
