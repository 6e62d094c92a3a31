//! Agent health snapshot returned by `status()`.

use serde::{Deserialize, Serialize};

/// Coarse liveness state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    #[default]
    Active,
    Degraded,
    Offline,
}

impl AgentState {
    pub fn as_str(&self) -> &str {
        match self {
            AgentState::Active => "active",
            AgentState::Degraded => "degraded",
            AgentState::Offline => "offline",
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Health snapshot of a single agent.
///
/// Produced by the adapter itself; used for liveness checks only and never
/// consulted by the negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Human readable name
    pub name: String,
    pub state: AgentState,
    /// Tools or skills the agent advertises
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Current load in `[0.0, 1.0]`, if the agent reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,
    /// RFC 3339 timestamp of the last call handled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

impl AgentStatus {
    pub fn active(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AgentState::Active,
            capabilities: Vec::new(),
            load: None,
            last_activity: None,
        }
    }

    pub fn with_state(mut self, state: AgentState) -> Self {
        self.state = state;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_load(mut self, load: f64) -> Self {
        self.load = Some(load.clamp(0.0, 1.0));
        self
    }

    pub fn with_last_activity(mut self, timestamp: impl Into<String>) -> Self {
        self.last_activity = Some(timestamp.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.state == AgentState::Active
    }
}
