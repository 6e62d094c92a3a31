//! Configuration file loading for conclave
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONCLAVE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./conclave.toml` or `./.conclave.toml`
//! 4. Global config: `$XDG_CONFIG_HOME/conclave/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;
mod validation;

pub use error::ConfigError;
pub use file_config::{
    FileAgentConfig, FileConfig, FileDiscussionConfig, FileLogConfig, FileOutputConfig,
    FileOutputFormat,
};
pub use loader::ConfigLoader;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
