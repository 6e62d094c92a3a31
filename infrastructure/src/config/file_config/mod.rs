//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application and agent
//! types at startup.

mod agent;
mod discussion;
mod log;
mod output;

pub use agent::FileAgentConfig;
pub use discussion::FileDiscussionConfig;
pub use log::FileLogConfig;
pub use output::{FileOutputConfig, FileOutputFormat};

use super::validation::{ConfigIssue, ConfigIssueCode};
use crate::agents::{AgentProfile, builtin};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Negotiation loop settings
    pub discussion: FileDiscussionConfig,
    /// Agent definitions; the built-in pair is used when empty
    pub agents: Vec<FileAgentConfig>,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log file settings
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Build agent profiles in configuration order.
    ///
    /// Disabled entries are skipped and entries with fatal issues are
    /// dropped; every issue found is returned.
    pub fn profiles(&self) -> (Vec<AgentProfile>, Vec<ConfigIssue>) {
        if self.agents.is_empty() {
            return (builtin::default_profiles(), Vec::new());
        }

        let mut profiles = Vec::new();
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for entry in self.agents.iter().filter(|a| a.enabled) {
            let (profile, mut entry_issues) = entry.to_profile();
            issues.append(&mut entry_issues);
            let Some(profile) = profile else { continue };
            if !seen.insert(profile.id.clone()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgentId(profile.id.to_string()),
                    format!("agent id '{}' is defined more than once", profile.id),
                ));
                continue;
            }
            profiles.push(profile);
        }

        if seen.is_empty() && issues.iter().all(|i| !i.is_error()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoEnabledAgents,
                "agents are configured but none is enabled",
            ));
        }

        (profiles, issues)
    }

    /// Validate the whole configuration.
    ///
    /// Returns every issue found (errors and warnings). Callers decide
    /// how to handle each severity level.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let discussion = &self.discussion;

        if discussion.rounds == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroRounds,
                "discussion.rounds = 0: agents will propose without reviewing each other",
            ));
        }
        if discussion.call_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "discussion.call_timeout_secs must be greater than 0",
            ));
        }
        if discussion.event_buffer == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroEventBuffer,
                "discussion.event_buffer must be greater than 0",
            ));
        }

        issues.extend(self.profiles().1);
        issues
    }
}
