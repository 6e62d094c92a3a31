//! Built-in profiles used when no `[[agents]]` are configured.
//!
//! | Profile | Strength | Solo executor |
//! |---------|----------|---------------|
//! | `planner` | research, analysis, code design | itself |
//! | `executor` | system-level commands | itself |
//!
//! Each profile's collaborative plan names the other one as actor for part of
//! the work, so the pair is meant to be registered together.

use super::profile::{
    AgentProfile, FeedbackRule, KeywordRule, PlanTemplate, StepResult, StepTemplate,
};
use std::time::Duration;

pub const PLANNER: &str = "planner";
pub const EXECUTOR: &str = "executor";

/// Look up a built-in profile by name.
pub fn preset(name: &str) -> Option<AgentProfile> {
    match name.to_lowercase().as_str() {
        PLANNER => Some(planner()),
        EXECUTOR => Some(executor()),
        _ => None,
    }
}

/// Both built-in profiles in their default registration order.
pub fn default_profiles() -> Vec<AgentProfile> {
    vec![planner(), executor()]
}

pub fn planner() -> AgentProfile {
    AgentProfile {
        name: "Strategic Planner".to_string(),
        capabilities: vec![
            "web_search".to_string(),
            "code_execution".to_string(),
            "file_system".to_string(),
            "image_generation".to_string(),
            "data_analysis".to_string(),
        ],
        latency: Duration::from_millis(150),
        rules: vec![
            KeywordRule::new(
                &["search", "find", "research", "information"],
                "web_research",
                "The request needs information gathered from the web: \"{message}\"",
                0.9,
                &["web_search", "data_analysis"],
            ),
            KeywordRule::new(
                &["code", "program", "develop", "implement"],
                "code_development",
                "The request needs code to be written and run: \"{message}\"",
                0.95,
                &["code_execution", "file_system"],
            ),
            KeywordRule::new(
                &["file", "document", "save"],
                "file_management",
                "The request is mostly file system work: \"{message}\"",
                0.85,
                &["file_system"],
            ),
            KeywordRule::new(
                &["image", "picture", "draw"],
                "image_processing",
                "The request needs image generation or processing: \"{message}\"",
                0.8,
                &["image_generation"],
            ),
        ],
        fallback: KeywordRule::new(
            &[],
            "comprehensive",
            "A compound request that needs broad analysis and several tools: \"{message}\"",
            0.7,
            &["web_search", "code_execution", "file_system"],
        ),
        feedback: vec![
            FeedbackRule::new(
                "direct_execution",
                "The direct approach of {peers} is efficient. I will analyze and plan while they run the commands.",
                0.9,
                &["role_division", "planning"],
            ),
            FeedbackRule::new(
                "system_level",
                "{peers} work at the system level; I will take the higher-level logic and data handling.",
                0.85,
                &["layered_approach", "planning"],
            ),
        ],
        default_feedback: FeedbackRule::new(
            "",
            "Combining my approach with that of {peers} gives a stronger solution. I suggest working in parallel on our strengths.",
            0.75,
            &["parallel_processing", "planning"],
        ),
        solo_feedback: FeedbackRule::new(
            "",
            "No peer input is available. I will carry the work on my own.",
            0.3,
            &["solo_execution", "error_handling"],
        ),
        collaborative_plan: PlanTemplate {
            summary: "Planner and executor collaborate on \"{request}\"".to_string(),
            confidence: 0.9,
            steps: vec![
                StepTemplate::own("Analyze the requirements and draft an execution plan"),
                StepTemplate::own("Gather the required information and resources"),
                StepTemplate::by(EXECUTOR, "Run the core commands"),
                StepTemplate::own("Verify the results and summarize"),
            ],
            estimated_time: Some("3-5 min".to_string()),
        },
        solo_plan: PlanTemplate {
            summary: "Planner handles \"{request}\" end to end".to_string(),
            confidence: 0.8,
            steps: vec![
                StepTemplate::own("Perform a comprehensive analysis"),
                StepTemplate::own("Execute with multiple tools"),
                StepTemplate::own("Consolidate and summarize the results"),
            ],
            estimated_time: Some("2-4 min".to_string()),
        },
        step_results: vec![
            StepResult::new(
                "analy",
                "Analyzed the requirements and settled on an execution strategy.",
            ),
            StepResult::new(
                "gather",
                "Collected the needed information through search and data analysis.",
            ),
            StepResult::new("verif", "Verified the results and checked their quality."),
            StepResult::new(
                "summar",
                "Organized the results into a user-friendly summary.",
            ),
        ],
        ..AgentProfile::generic(PLANNER)
    }
}

pub fn executor() -> AgentProfile {
    AgentProfile {
        name: "System Executor".to_string(),
        capabilities: vec![
            "system_commands".to_string(),
            "file_operations".to_string(),
            "process_management".to_string(),
            "network_tools".to_string(),
        ],
        latency: Duration::from_millis(80),
        rules: vec![
            KeywordRule::new(
                &["file", "list", "ls", "directory"],
                "direct_execution",
                "Interpreted as a file system command: \"{message}\"",
                0.9,
                &["file_operations"],
            ),
            KeywordRule::new(
                &["process", "run", "ps"],
                "direct_execution",
                "Interpreted as a process management command: \"{message}\"",
                0.85,
                &["process_management"],
            ),
            KeywordRule::new(
                &["system", "status", "uptime"],
                "direct_execution",
                "Interpreted as a system information query: \"{message}\"",
                0.95,
                &["system_commands"],
            ),
            KeywordRule::new(
                &["network", "connection", "ping"],
                "direct_execution",
                "Interpreted as a network command: \"{message}\"",
                0.8,
                &["network_tools"],
            ),
        ],
        fallback: KeywordRule::new(
            &[],
            "managed_execution",
            "Treated as a general command for the managed runtime: \"{message}\"",
            0.7,
            &["system_commands"],
        ),
        feedback: vec![
            FeedbackRule::new(
                "code_execution",
                "The broad approach of {peers} works well. I will run the system commands while they design the logic.",
                0.9,
                &["system_level", "direct_execution"],
            ),
            FeedbackRule::new(
                "web_search",
                "While {peers} search the web, I will prepare the local environment and files.",
                0.85,
                &["parallel_execution", "direct_execution"],
            ),
            FeedbackRule::new(
                "planning",
                "{peers} laid out a plan; I can support each step with fast command execution.",
                0.95,
                &["step_by_step_support", "direct_execution"],
            ),
        ],
        default_feedback: FeedbackRule::new(
            "",
            "I will complement the approach of {peers} with fast system command execution.",
            0.75,
            &["complementary_execution", "direct_execution"],
        ),
        solo_feedback: FeedbackRule::new(
            "",
            "No peer input is available. I will run the work through the executor alone.",
            0.2,
            &["solo_execution", "error_recovery"],
        ),
        collaborative_plan: PlanTemplate {
            summary: "Executor and planner share the work on \"{request}\"".to_string(),
            confidence: 0.9,
            steps: vec![
                StepTemplate::own("Check and prepare the system environment").independent(),
                StepTemplate::by(PLANNER, "Draft a detailed plan and analyze resources")
                    .independent(),
                StepTemplate::own("Run the core commands"),
                StepTemplate::by(PLANNER, "Verify the results and follow up"),
            ],
            estimated_time: Some("1-3 min".to_string()),
        },
        solo_plan: PlanTemplate {
            summary: "Executor runs \"{request}\" directly".to_string(),
            confidence: 0.85,
            steps: vec![
                StepTemplate::own("Verify the commands are safe"),
                StepTemplate::own("Run the commands"),
                StepTemplate::own("Collect and summarize the output"),
            ],
            estimated_time: Some("30s-1 min".to_string()),
        },
        step_results: vec![
            StepResult::new(
                "environment",
                "System environment checked: user, working directory and clock are in order.",
            ),
            StepResult::new("safe", "Commands validated against the safety list."),
            StepResult::new("run", "Commands ran successfully."),
            StepResult::new("summar", "Output collected and formatted for the user."),
        ],
        ..AgentProfile::generic(EXECUTOR)
    }
}
