//! CLI entrypoint for conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use conclave_application::{ConversationLogger, NoConversationLogger, Orchestrator};
use conclave_domain::SessionId;
use conclave_infrastructure::{
    AgentProfile, ConfigLoader, FileConfig, FileOutputFormat, JsonlConversationLogger,
    build_registry,
};
use conclave_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormat, observer_for, run_cycle};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let loaded = if cli.no_config {
        Ok(ConfigLoader::load_defaults())
    } else {
        ConfigLoader::load(cli.config.as_ref())
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => bail!("Failed to load configuration: {}", e),
    };

    let log_file = cli.log_file.clone().or_else(|| config.log.file.clone());
    let _guard = init_logging(cli.verbose, config.log.level.as_deref(), log_file.as_deref())?;

    info!("Starting conclave");

    let (config, warnings) = ConfigLoader::check(config)?;
    for issue in &warnings {
        warn!("{}", issue);
    }

    // === Dependency Injection ===
    let profiles = select_profiles(&config, &cli.agent)?;
    let registry = build_registry(profiles)?;

    let mut discussion = config.discussion.to_discussion_config();
    if let Some(rounds) = cli.rounds {
        discussion = discussion.with_rounds(rounds);
    }
    if let Some(secs) = cli.timeout {
        discussion = discussion.with_call_timeout(Duration::from_secs(secs));
    }

    let logger: Arc<dyn ConversationLogger> = match cli
        .conversation_log
        .as_ref()
        .or(config.log.conversation.as_ref())
        .and_then(JsonlConversationLogger::new)
    {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    };

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(registry), discussion, logger));

    if cli.health {
        println!("{}", ConsoleFormatter::format_health(&orchestrator.health()));
        return Ok(ExitCode::SUCCESS);
    }

    let configured_format = cli.output.or(config.output.format.map(|f| match f {
        FileOutputFormat::Full => OutputFormat::Full,
        FileOutputFormat::Result => OutputFormat::Result,
        FileOutputFormat::Json => OutputFormat::Json,
    }));
    let show_progress = !cli.quiet && config.output.show_progress;
    if !config.output.color {
        conclave_presentation::disable_color();
    }

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(orchestrator.clone(), cli.session.as_str())?
            .with_progress(show_progress)
            .with_format(configured_format.unwrap_or(OutputFormat::Result));
        repl.run().await?;
        orchestrator.shutdown();
        return Ok(ExitCode::SUCCESS);
    }

    // Single message mode - message is required
    let format = configured_format.unwrap_or(OutputFormat::Full);
    let message = match cli.message {
        Some(m) => m,
        None => bail!("A message is required. Use --chat for interactive mode."),
    };

    if !cli.quiet && format != OutputFormat::Json {
        println!();
        println!("+============================================================+");
        println!("|                  Conclave - Agent Council                  |");
        println!("+============================================================+");
        println!();
        println!("Request: {}", message);
        println!(
            "Agents: {}",
            orchestrator
                .registry()
                .priority_order()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    let session = SessionId::new(cli.session.as_str());
    let mut events = orchestrator.connect(session.clone())?;
    let observer = observer_for(show_progress, format);

    let cycle = run_cycle(&orchestrator, &session, &mut events, &message, observer.as_ref());
    let report = tokio::select! {
        report = cycle => report?,
        _ = tokio::signal::ctrl_c() => {
            observer.finish();
            orchestrator.shutdown();
            bail!("Interrupted");
        }
    };
    orchestrator.shutdown();

    println!("{}", ConsoleFormatter::render(&report, format));

    Ok(if report.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Initialize tracing: stderr always, plus an optional plain-text file.
///
/// `-v` flags win over `RUST_LOG`, which wins over `[log] level`.
fn init_logging(
    verbose: u8,
    configured: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("warn"))),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let dir = dir.unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Configured profiles, narrowed to `--agent` ids when given.
///
/// Registration order (and so tie-break priority) follows the config file.
fn select_profiles(config: &FileConfig, only: &[String]) -> Result<Vec<AgentProfile>> {
    let (profiles, _) = config.profiles();
    if only.is_empty() {
        return Ok(profiles);
    }

    for id in only {
        if !profiles.iter().any(|p| p.id.as_str() == id) {
            let available: Vec<_> = profiles.iter().map(|p| p.id.to_string()).collect();
            bail!(
                "Unknown agent '{}'. Available: {}",
                id,
                available.join(", ")
            );
        }
    }
    Ok(profiles
        .into_iter()
        .filter(|p| only.iter().any(|id| id == p.id.as_str()))
        .collect())
}
