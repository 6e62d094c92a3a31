//! Agent definitions from TOML (`[[agents]]` entries)
//!
//! Each entry either starts from a built-in preset or from a generic
//! profile, then overrides individual fields:
//!
//! ```toml
//! [[agents]]
//! id = "planner"
//! preset = "planner"
//! latency_ms = 0
//!
//! [[agents]]
//! id = "reviewer"
//! name = "Reviewer agent"
//! capabilities = ["code_review"]
//! [[agents.rules]]
//! keywords = ["review", "audit"]
//! approach = "code_review"
//! analysis = "Audit the changes behind \"{message}\""
//! confidence = 0.85
//! ```

use crate::agents::{
    AgentProfile, FeedbackRule, KeywordRule, PlanTemplate, StepResult, builtin,
};
use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use conclave_domain::AgentId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw agent definition from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub id: String,
    /// Built-in profile to start from (`planner`, `executor`)
    pub preset: Option<String>,
    pub enabled: bool,
    pub name: Option<String>,
    pub capabilities: Option<Vec<String>>,
    /// Simulated latency per call in milliseconds
    pub latency_ms: Option<u64>,
    /// Concurrent calls counted as full load
    pub concurrency: Option<usize>,
    pub collaboration_threshold: Option<f64>,
    /// Keyword rules, checked before the preset's own rules
    pub rules: Vec<KeywordRule>,
    pub fallback: Option<KeywordRule>,
    /// Feedback rules, checked before the preset's own rules
    pub feedback: Vec<FeedbackRule>,
    pub collaborative_plan: Option<PlanTemplate>,
    pub solo_plan: Option<PlanTemplate>,
    pub step_results: Vec<StepResult>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            preset: None,
            enabled: true,
            name: None,
            capabilities: None,
            latency_ms: None,
            concurrency: None,
            collaboration_threshold: None,
            rules: Vec::new(),
            fallback: None,
            feedback: Vec::new(),
            collaborative_plan: None,
            solo_plan: None,
            step_results: Vec::new(),
        }
    }
}

impl FileAgentConfig {
    /// Build the profile for this entry.
    ///
    /// Returns `None` when the entry has a fatal issue; warnings are
    /// returned alongside a usable profile.
    pub fn to_profile(&self) -> (Option<AgentProfile>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let id = self.id.trim();
        if id.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyAgentId,
                "agents entry has an empty id",
            ));
            return (None, issues);
        }
        let agent_id = AgentId::new(id);
        if agent_id.is_reserved() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ReservedAgentId(id.to_string()),
                format!("agent id '{}' is reserved", id),
            ));
            return (None, issues);
        }

        let mut profile = match &self.preset {
            Some(name) => match builtin::preset(name) {
                Some(preset) => preset,
                None => {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::UnknownPreset {
                            agent: id.to_string(),
                            preset: name.clone(),
                        },
                        format!(
                            "agent '{}': unknown preset '{}' (expected planner or executor)",
                            id, name
                        ),
                    ));
                    return (None, issues);
                }
            },
            None => AgentProfile::generic(agent_id.clone()),
        };
        profile.id = agent_id;
        // A renamed preset is displayed under its own id.
        if self.preset.as_deref().is_some_and(|preset| preset != id) {
            profile.name = id.to_string();
        }

        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(capabilities) = &self.capabilities {
            profile.capabilities = capabilities.clone();
        }
        if let Some(ms) = self.latency_ms {
            profile.latency = Duration::from_millis(ms);
        }
        if let Some(concurrency) = self.concurrency {
            profile.concurrency = concurrency.max(1);
        }
        if let Some(threshold) = self.collaboration_threshold {
            profile.collaboration_threshold = threshold;
        }
        if !self.rules.is_empty() {
            let mut rules = self.rules.clone();
            rules.append(&mut profile.rules);
            profile.rules = rules;
        }
        if let Some(fallback) = &self.fallback {
            profile.fallback = fallback.clone();
        }
        if !self.feedback.is_empty() {
            let mut feedback = self.feedback.clone();
            feedback.append(&mut profile.feedback);
            profile.feedback = feedback;
        }
        if let Some(plan) = &self.collaborative_plan {
            profile.collaborative_plan = plan.clone();
        }
        if let Some(plan) = &self.solo_plan {
            profile.solo_plan = plan.clone();
        }
        if !self.step_results.is_empty() {
            let mut results = self.step_results.clone();
            results.append(&mut profile.step_results);
            profile.step_results = results;
        }

        issues.extend(range_issues(id, &profile));
        (Some(profile), issues)
    }
}

fn range_issues(id: &str, profile: &AgentProfile) -> Vec<ConfigIssue> {
    let mut values: Vec<(String, f64)> = vec![
        ("collaboration_threshold".into(), profile.collaboration_threshold),
        ("fallback.confidence".into(), profile.fallback.confidence),
        (
            "collaborative_plan.confidence".into(),
            profile.collaborative_plan.confidence,
        ),
        ("solo_plan.confidence".into(), profile.solo_plan.confidence),
    ];
    values.extend(
        profile
            .rules
            .iter()
            .map(|r| (format!("rules[{}].confidence", r.approach), r.confidence)),
    );
    values.extend(
        profile
            .feedback
            .iter()
            .map(|r| (format!("feedback[{}].score", r.when), r.score)),
    );

    values
        .into_iter()
        .filter(|(_, value)| !(0.0..=1.0).contains(value))
        .map(|(field, value)| {
            ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    agent: id.to_string(),
                    field: field.clone(),
                    value,
                },
                format!(
                    "agent '{}': {} = {} is outside [0, 1]",
                    id, field, value
                ),
            )
        })
        .collect()
}
