//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::cli::commands::OutputFormat;
use crate::cycle::run_cycle;
use crate::output::console::ConsoleFormatter;
use crate::progress::observer_for;
use conclave_application::{EventSubscriber, Orchestrator, OrchestratorError};
use conclave_domain::SessionId;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;

const HISTORY_SIZE: usize = 1000;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Agents,
    /// Drop the session and start a fresh one under the same id
    Reset,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`. Returns `None` for plain messages.
    pub fn parse(line: &str) -> Option<Self> {
        let cmd = line.strip_prefix('/')?;
        Some(match cmd.split_whitespace().next().unwrap_or("") {
            "quit" | "exit" | "q" => ReplCommand::Quit,
            "help" | "h" | "?" => ReplCommand::Help,
            "agents" => ReplCommand::Agents,
            "reset" => ReplCommand::Reset,
            _ => ReplCommand::Unknown(line.to_string()),
        })
    }
}

/// Interactive chat REPL bound to one session
pub struct ChatRepl {
    orchestrator: Arc<Orchestrator>,
    session: SessionId,
    events: EventSubscriber,
    format: OutputFormat,
    show_progress: bool,
}

impl ChatRepl {
    /// Create a new ChatRepl, subscribing to `session`
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        session: impl Into<SessionId>,
    ) -> Result<Self, OrchestratorError> {
        let session = session.into();
        let events = orchestrator.connect(session.clone())?;
        Ok(Self {
            orchestrator,
            session,
            events,
            format: OutputFormat::Result,
            show_progress: true,
        })
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set how each finished cycle is printed
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the interactive REPL
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut editor = Reedline::create();

        let history_path = dirs::data_dir().map(|p| p.join("conclave").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(history) = FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
                editor = editor.with_history(Box::new(history));
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("conclave".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        self.orchestrator.disconnect(&self.session);
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│             Conclave - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Agents: {}",
            self.orchestrator
                .registry()
                .priority_order()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /agents          - Show agent health");
        println!("  /reset           - Start over with a fresh session");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                true
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
                false
            }
            ReplCommand::Agents => {
                println!();
                println!("{}", ConsoleFormatter::format_health(&self.orchestrator.health()));
                false
            }
            ReplCommand::Reset => {
                self.orchestrator.disconnect(&self.session);
                match self.orchestrator.connect(self.session.clone()) {
                    Ok(events) => {
                        self.events = events;
                        println!("Started a fresh session.");
                        false
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        true
                    }
                }
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_message(&mut self, message: &str) {
        println!();

        let observer = observer_for(self.show_progress, self.format);
        match run_cycle(
            &self.orchestrator,
            &self.session,
            &mut self.events,
            message,
            observer.as_ref(),
        )
        .await
        {
            Ok(report) => println!("{}", ConsoleFormatter::render(&report, self.format)),
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }
}
