//! Log configuration from TOML (`[log]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw log configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Diagnostic log file (tracing output)
    pub file: Option<PathBuf>,
    /// Conversation log file (JSONL, one event per line)
    pub conversation: Option<PathBuf>,
    /// Default filter directive when `RUST_LOG` is unset, e.g. `"info"`
    pub level: Option<String>,
}
