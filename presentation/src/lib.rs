//! Presentation layer for conclave
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod cycle;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, OutputFormat};
pub use cycle::{CycleError, run_cycle};
pub use output::console::ConsoleFormatter;
pub use output::disable_color;
pub use output::report::{AgentMessage, CycleReport};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use progress::{CycleObserver, NoProgress, observer_for};
