//! Console output formatter for cycle reports

use super::report::CycleReport;
use crate::cli::commands::OutputFormat;
use colored::Colorize;
use conclave_application::HealthReport;
use conclave_domain::{ExecutionResult, ExecutionStatus};

/// Formats cycle reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a report in the requested format
    pub fn render(report: &CycleReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(report),
            OutputFormat::Result => Self::format_result_only(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Format the complete cycle
    pub fn format(report: &CycleReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Conclave Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Request:".cyan().bold(),
            report.request
        ));

        if !report.messages.is_empty() {
            output.push_str(&Self::section_header("Discussion"));
            for message in &report.messages {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", message.agent).yellow().bold(),
                    message.text
                ));
            }
        }

        if let Some(consensus) = &report.consensus {
            output.push_str(&Self::section_header("Consensus"));
            output.push_str(&format!("\n{}\n", consensus));
        }

        if let Some(result) = &report.result {
            output.push_str(&Self::section_header("Execution"));
            output.push_str(&Self::outcomes(result));
        }

        if let Some(error) = &report.error {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        }

        if report.dropped_events > 0 {
            output.push_str(&format!(
                "\n{}\n",
                format!("({} events dropped)", report.dropped_events).dimmed()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &CycleReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the execution result only (concise output)
    pub fn format_result_only(report: &CycleReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Conclave Result ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), report.request));

        match (&report.result, &report.error) {
            (_, Some(error)) => {
                output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
            }
            (Some(result), None) => {
                output.push_str(&format!("{}\n", result.summary));
                output.push_str(&Self::outcomes(result));
            }
            (None, None) => output.push_str("(no result)\n"),
        }

        output
    }

    /// Format an agent health snapshot
    pub fn format_health(report: &HealthReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Agents:".cyan().bold()));
        for agent in &report.agents {
            let status = &agent.status;
            let state = if status.is_active() {
                status.state.as_str().green()
            } else {
                status.state.as_str().red()
            };
            output.push_str(&format!("  {} ({}) [{}]", agent.id, status.name, state));
            if let Some(load) = status.load {
                output.push_str(&format!(" load {:.0}%", load * 100.0));
            }
            output.push('\n');
            if !status.capabilities.is_empty() {
                output.push_str(&format!(
                    "    {}\n",
                    status.capabilities.join(", ").dimmed()
                ));
            }
        }
        output.push_str(&format!(
            "{} {}\n",
            "Active sessions:".dimmed(),
            report.active_sessions
        ));
        output
    }

    fn outcomes(result: &ExecutionResult) -> String {
        let mut output = String::new();
        for outcome in &result.outcomes {
            let mark = if outcome.success {
                "v".green()
            } else {
                "x".red()
            };
            output.push_str(&format!(
                "  {} [{}] {}: {}\n",
                mark, outcome.actor, outcome.action, outcome.output
            ));
        }
        let status = match result.status {
            ExecutionStatus::Success => result.status.as_str().green(),
            ExecutionStatus::Partial => result.status.as_str().yellow(),
            ExecutionStatus::Failure => result.status.as_str().red(),
        };
        output.push_str(&format!(
            "\n{} {} ({} ok, {} failed, executor: {})\n",
            "Status:".bold(),
            status,
            result.succeeded(),
            result.failed(),
            result.executor
        ));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
