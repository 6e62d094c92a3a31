//! Live progress while a cycle runs

pub mod reporter;

use crate::cli::commands::OutputFormat;
use conclave_domain::SessionEvent;
use reporter::{ProgressReporter, SimpleProgress};
use std::io::IsTerminal;

/// Receives every event of a running cycle, in order.
pub trait CycleObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);

    /// Called once after the terminal event (or when the session closed).
    fn finish(&self) {}
}

/// Observer that shows nothing (`--quiet`)
pub struct NoProgress;

impl CycleObserver for NoProgress {
    fn on_event(&self, _event: &SessionEvent) {}
}

/// Pick the progress display for a run.
///
/// A spinner when stderr is a terminal, plain lines otherwise. Plain lines go
/// to stdout, so they are skipped when stdout carries JSON.
pub fn observer_for(show_progress: bool, format: OutputFormat) -> Box<dyn CycleObserver> {
    if !show_progress {
        return Box::new(NoProgress);
    }
    if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new().with_messages(format == OutputFormat::Full))
    } else if format == OutputFormat::Json {
        Box::new(NoProgress)
    } else {
        Box::new(SimpleProgress)
    }
}
