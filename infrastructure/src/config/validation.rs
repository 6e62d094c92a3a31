//! Structured configuration issues.
//!
//! Validation never stops at the first problem: every issue found is
//! returned with a severity so callers can warn on some and refuse to start
//! on others.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssueCode {
    /// `discussion.rounds = 0`: agents never review each other.
    ZeroRounds,
    ZeroTimeout,
    ZeroEventBuffer,
    EmptyAgentId,
    /// The id `all` is reserved for the collaborative executor.
    ReservedAgentId(String),
    DuplicateAgentId(String),
    UnknownPreset { agent: String, preset: String },
    /// Confidence, score or threshold outside [0, 1].
    OutOfRange { agent: String, field: String, value: f64 },
    /// `[[agents]]` entries exist but all are disabled.
    NoEnabledAgents,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
