//! Progress reporting for a negotiation cycle

use super::CycleObserver;
use colored::Colorize;
use conclave_domain::{Phase, SessionEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Reports progress with a spinner showing the current phase
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    show_messages: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            show_messages: true,
        }
    }

    /// Print agent messages above the spinner as they arrive
    pub fn with_messages(mut self, show: bool) -> Self {
        self.show_messages = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn phase_display_name(phase: &Phase) -> String {
        let number = match phase {
            Phase::Analyzing => 1,
            Phase::Discussing => 2,
            Phase::ConsensusReached => 3,
            Phase::Executing => 4,
            _ => return phase.display_name().to_string(),
        };
        format!("Phase {}: {}", number, phase.display_name())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let mut slot = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let spinner = slot.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        f(spinner);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleObserver for ProgressReporter {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::PhaseUpdate { phase, note } => self.with_spinner(|pb| {
                pb.set_prefix(Self::phase_display_name(phase));
                pb.set_message(note.clone());
            }),
            SessionEvent::AgentMessage { agent_id, text } if self.show_messages => {
                self.with_spinner(|pb| {
                    pb.println(format!("  {} {}", format!("[{}]", agent_id).yellow(), text));
                })
            }
            SessionEvent::AgentMessage { agent_id, .. } => self.with_spinner(|pb| {
                pb.set_message(format!("{} {}", "v".green(), agent_id));
            }),
            SessionEvent::ConsensusReached { summary } => self.with_spinner(|pb| {
                pb.println(format!("{} {}", "Consensus:".green().bold(), summary));
            }),
            SessionEvent::ExecutionResult { .. } | SessionEvent::Error { .. } => self.finish(),
        }
    }

    fn finish(&self) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SimpleProgress {
    /// The line printed for an event, if any
    pub fn line(event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::PhaseUpdate { phase, note } => Some(format!(
                "{} {} {}",
                "->".cyan(),
                ProgressReporter::phase_display_name(phase).as_str().bold(),
                note.dimmed()
            )),
            SessionEvent::AgentMessage { agent_id, text } => {
                Some(format!("  {} {}: {}", "v".green(), agent_id, text))
            }
            SessionEvent::ConsensusReached { summary } => {
                Some(format!("  {} {}", "Consensus:".green(), summary))
            }
            SessionEvent::ExecutionResult { result } => Some(format!(
                "  {} {} ({} steps)",
                "Done:".bold(),
                result.status,
                result.outcomes.len()
            )),
            SessionEvent::Error { message } => Some(format!("  {} {}", "x".red(), message)),
        }
    }
}

impl CycleObserver for SimpleProgress {
    fn on_event(&self, event: &SessionEvent) {
        if let Some(line) = Self::line(event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::AgentId;

    #[test]
    fn test_simple_progress_lines() {
        colored::control::set_override(false);
        let line = SimpleProgress::line(&SessionEvent::phase_update(Phase::Discussing, "round 1"))
            .unwrap();
        assert_eq!(line, "-> Phase 2: Discussion round 1");

        let line =
            SimpleProgress::line(&SessionEvent::agent_message(&AgentId::new("planner"), "ok"))
                .unwrap();
        assert_eq!(line, "  v planner: ok");

        let line = SimpleProgress::line(&SessionEvent::error("boom")).unwrap();
        assert_eq!(line, "  x boom");
    }

    #[test]
    fn test_phase_labels_number_active_phases() {
        assert_eq!(
            ProgressReporter::phase_display_name(&Phase::ConsensusReached),
            "Phase 3: Consensus"
        );
        assert_eq!(ProgressReporter::phase_display_name(&Phase::Completed), "Completed");
    }

    #[test]
    fn test_reporter_clears_spinner_on_terminal_event() {
        let reporter = ProgressReporter::new().with_messages(false);
        reporter.on_event(&SessionEvent::phase_update(Phase::Analyzing, ""));
        assert!(reporter.spinner.lock().unwrap().is_some());
        reporter.on_event(&SessionEvent::error("boom"));
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
