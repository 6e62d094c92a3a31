//! Agent profiles: the rules a [`ProfileAgent`](super::ProfileAgent) follows.
//!
//! A profile is plain data: keyword rules for analysis, feedback rules for
//! peer review, two plan templates and canned step outputs. Profiles are
//! deserializable so `[[agents]]` entries can override or extend them.

use conclave_domain::AgentId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maps request keywords to an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Matched case-insensitively as substrings of the request
    #[serde(default)]
    pub keywords: Vec<String>,
    pub approach: String,
    /// Analysis text; `{message}` is replaced by the request
    pub analysis: String,
    pub confidence: f64,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl KeywordRule {
    pub fn new(
        keywords: &[&str],
        approach: &str,
        analysis: &str,
        confidence: f64,
        tools: &[&str],
    ) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            approach: approach.to_string(),
            analysis: analysis.to_string(),
            confidence,
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn matches(&self, lowered_request: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| lowered_request.contains(&k.to_lowercase()))
    }
}

/// Feedback given when a peer shows a given trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRule {
    /// Peer approach, tool or suggestion this rule reacts to
    #[serde(default)]
    pub when: String,
    /// Feedback text; `{peers}` is replaced by the reviewed agents
    pub feedback: String,
    /// Collaboration score attached to the feedback
    pub score: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl FeedbackRule {
    pub fn new(when: &str, feedback: &str, score: f64, suggestions: &[&str]) -> Self {
        Self {
            when: when.to_string(),
            feedback: feedback.to_string(),
            score,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One step of a plan template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTemplate {
    /// Agent to run the step; the profile's own id when absent
    #[serde(default)]
    pub actor: Option<String>,
    pub action: String,
    #[serde(default)]
    pub independent: bool,
}

impl StepTemplate {
    pub fn own(action: &str) -> Self {
        Self {
            actor: None,
            action: action.to_string(),
            independent: false,
        }
    }

    pub fn by(actor: &str, action: &str) -> Self {
        Self {
            actor: Some(actor.to_string()),
            ..Self::own(action)
        }
    }

    pub fn independent(mut self) -> Self {
        self.independent = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    /// Summary text; `{request}` is replaced by the request
    pub summary: String,
    pub confidence: f64,
    #[serde(default)]
    pub steps: Vec<StepTemplate>,
    #[serde(default)]
    pub estimated_time: Option<String>,
}

/// Canned output for steps whose action contains `contains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub contains: String,
    pub output: String,
}

impl StepResult {
    pub fn new(contains: &str, output: &str) -> Self {
        Self {
            contains: contains.to_string(),
            output: output.to_string(),
        }
    }
}

/// Complete behaviour of one profile agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: String,
    pub capabilities: Vec<String>,
    /// Simulated thinking time per call
    pub latency: Duration,
    /// Calls in flight that count as full load
    pub concurrency: usize,
    pub rules: Vec<KeywordRule>,
    pub fallback: KeywordRule,
    pub feedback: Vec<FeedbackRule>,
    /// Used when no feedback rule matches any peer
    pub default_feedback: FeedbackRule,
    /// Used when there is nobody to review
    pub solo_feedback: FeedbackRule,
    /// Average own collaboration score above which the collaborative plan is proposed
    pub collaboration_threshold: f64,
    pub collaborative_plan: PlanTemplate,
    pub solo_plan: PlanTemplate,
    pub step_results: Vec<StepResult>,
}

impl AgentProfile {
    /// A generic profile with neutral rules.
    pub fn generic(id: impl Into<AgentId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            capabilities: Vec::new(),
            latency: Duration::ZERO,
            concurrency: 4,
            rules: Vec::new(),
            fallback: KeywordRule::new(
                &[],
                "general",
                "General analysis of \"{message}\"",
                0.6,
                &[],
            ),
            feedback: Vec::new(),
            default_feedback: FeedbackRule::new(
                "",
                "Reviewed the approaches of {peers}; they complement mine.",
                0.7,
                &["complementary_work"],
            ),
            solo_feedback: FeedbackRule::new(
                "",
                "No peer input is available; I will proceed on my own.",
                0.3,
                &["solo_execution"],
            ),
            collaboration_threshold: 0.8,
            collaborative_plan: PlanTemplate {
                summary: "Shared plan for \"{request}\"".to_string(),
                confidence: 0.75,
                steps: vec![StepTemplate::own("Coordinate the shared work")],
                estimated_time: None,
            },
            solo_plan: PlanTemplate {
                summary: "Handle \"{request}\" alone".to_string(),
                confidence: 0.65,
                steps: vec![StepTemplate::own("Carry out the request")],
                estimated_time: None,
            },
            step_results: Vec::new(),
        }
    }

    /// First rule matching the request, or the fallback.
    pub fn rule_for(&self, request: &str) -> &KeywordRule {
        let lowered = request.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .unwrap_or(&self.fallback)
    }

    /// Canned output for a step action.
    pub fn step_output(&self, action: &str) -> String {
        let lowered = action.to_lowercase();
        self.step_results
            .iter()
            .find(|r| lowered.contains(&r.contains.to_lowercase()))
            .map(|r| r.output.clone())
            .unwrap_or_else(|| format!("'{action}' completed"))
    }
}
