//! Taskmate - chat-driven task extraction
//!
//! CLI entry point: an interactive chat REPL and a one-shot parser.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use taskmate::cli::{Cli, Command, OutputFormat, get_log_path};
use taskmate::config::Config;
use taskmate::dialogue::{self, DialogueMachine};
use taskmate::domain::OperatingMode;
use taskmate::extract::TaskParser;
use taskmate::host::MemoryHost;
use taskmate::policy;
use taskmate::prompts::PromptLoader;
use taskmate::repl::{ConsoleTranscript, ReplSession};
use taskmate::transcript_log::TranscriptLogger;

fn setup_logging(cli_level: Option<&str>, config_level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level_name = cli_level.or(config_level).unwrap_or("info");
    let level: tracing::Level = level_name
        .parse()
        .map_err(|_| eyre::eyre!("Invalid log level: {}", level_name))?;
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first so its log-level can apply
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    config.validate().context("Invalid configuration")?;

    info!(
        "Taskmate loaded config: roster={}, default-mode={}",
        config.chat.roster.len(),
        config.chat.default_mode
    );

    match cli.command {
        Some(Command::Parse { message, mode, format }) => cmd_parse(&config, &message, mode, format),
        Some(Command::Chat { mode }) => cmd_chat(&config, mode).await,
        None => cmd_chat(&config, None).await,
    }
}

fn cmd_parse(config: &Config, message: &str, mode: OperatingMode, format: OutputFormat) -> Result<()> {
    let result = TaskParser::from_config(&config.chat).parse(message, mode);
    let decision = policy::decide(&result, mode);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "mode": mode,
                "result": result,
                "decision": decision,
            });
            println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialize result")?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Mode:".bright_cyan(), mode.label());
            println!("{} {}", "Suggested:".bright_cyan(), result.suggested_mode);
            if result.is_empty() {
                println!("{}", "No tasks found.".dimmed());
            }
            for (label, drafts) in [("Solo", &result.solo_tasks), ("Team", &result.team_tasks)] {
                if drafts.is_empty() {
                    continue;
                }
                println!("{}", format!("{} tasks:", label).bright_cyan());
                for (i, draft) in drafts.iter().enumerate() {
                    println!("  {} {}", draft.list_line(i + 1), format!("[{}]", draft.category).dimmed());
                }
            }
            let verdict = if decision.needs_confirmation {
                format!("confirmation needed ({})", decision.summary(&result, mode)).yellow()
            } else {
                decision.summary(&result, mode).green()
            };
            println!("{} {}", "Decision:".bright_cyan(), verdict);
            if let Some(variant) = decision.variant {
                println!("{} {}", "Prompt:".bright_cyan(), variant.template_name());
            }
        }
    }
    Ok(())
}

async fn cmd_chat(config: &Config, mode: Option<OperatingMode>) -> Result<()> {
    let mode = mode.unwrap_or(config.chat.default_mode);
    info!(%mode, "Starting chat session");

    let host = Arc::new(MemoryHost::new(mode));
    let mut collab = host.collaborators().with_transcript(Arc::new(ConsoleTranscript));
    if config.transcript.enabled {
        let logger =
            TranscriptLogger::open(config.transcript.resolved_dir()).context("Failed to open transcript log")?;
        info!("Transcript log: {}", logger.log_path().display());
        collab = collab.with_transcript(Arc::new(logger));
    }

    let machine =
        DialogueMachine::new(&config.chat, collab).with_prompts(PromptLoader::new(config.prompts.expanded_dir()));
    let (handle, runner) = dialogue::channel(machine, 32);
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    let runner = tokio::spawn(runner.with_error_channel(err_tx).run());

    tokio::spawn(async move {
        while let Some(e) = err_rx.recv().await {
            warn!("Chat error (retryable: {}): {}", e.is_retryable(), e);
            eprintln!("{} {}", "error:".red(), e);
        }
    });

    let session = ReplSession::new(handle, host.clone());
    tokio::task::spawn_blocking(move || session.run())
        .await
        .context("REPL thread panicked")??;

    // The session owned the last handle; the runner finishes any deferred commit
    let machine = runner.await.context("Dialogue runner panicked")?;
    info!(
        turns = machine.transcript().len(),
        tasks = host.tasks().len(),
        "Chat session ended"
    );
    Ok(())
}
