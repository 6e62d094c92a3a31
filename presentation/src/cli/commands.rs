//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with every phase
    Full,
    /// Only the execution result
    Result,
    /// JSON output
    Json,
}

/// CLI arguments for conclave
#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(
    author,
    version,
    about = "Agent council - independent agents discuss, agree on a plan and run it"
)]
#[command(long_about = r#"
Conclave hands a request to a council of agents and lets them negotiate.

Every request goes through four phases:
1. Analyze:   every agent analyzes the request on its own, in parallel
2. Discuss:   agents review each other's latest responses for N rounds
3. Consensus: every agent still standing proposes a plan; the most
              confident one wins (first-registered agent wins ties)
4. Execute:   the winning plan's steps are handed to their actors

Configuration files are loaded from (in priority order):
1. CONCLAVE_* environment variables
2. --config <path>     Explicit config file
3. ./conclave.toml     Project-level config
4. ~/.config/conclave/config.toml   Global config

Example:
  conclave "Build a landing page for the product launch"
  conclave -a planner --rounds 1 "Organize the shared drive"
  conclave --chat
"#)]
pub struct Cli {
    /// The request to negotiate (not required in chat mode)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Agents to include, by id (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub agent: Vec<String>,

    /// Number of discussion rounds (overrides config)
    #[arg(long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Per-call agent timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Session id used for the conversation
    #[arg(long, value_name = "ID", default_value = "cli")]
    pub session: String,

    /// Output format (defaults to the config file's, then `full`)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print agent health and exit
    #[arg(long)]
    pub health: bool,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append the negotiation transcript to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}
