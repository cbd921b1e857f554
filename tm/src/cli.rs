//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::OperatingMode;

/// Taskmate - turn chat messages into solo and team tasks
#[derive(Parser)]
#[command(
    name = "tm",
    about = "Turn informal chat messages into structured solo and team tasks",
    version,
    after_help = "Logs are written to: ~/.local/share/taskmate/logs/taskmate.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, help = "Log level (overrides config)")]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to chat)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Interactive chat session against an in-memory task board
    Chat {
        /// Operating mode to start in (defaults to chat.default-mode)
        #[arg(short, long)]
        mode: Option<OperatingMode>,
    },

    /// Parse one message and print the extracted drafts
    Parse {
        /// The message to parse
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Operating mode the message is parsed in
        #[arg(short, long, default_value = "solo")]
        mode: OperatingMode,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for the parse command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskmate")
        .join("logs")
        .join("taskmate.log")
}

/// A line typed into the chat REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Message(String),
    /// /yes
    Confirm,
    /// /switch
    ConfirmWithSwitch,
    /// /no
    Cancel,
    Mode(OperatingMode),
    Persona(crate::persona::Persona),
    /// /persona with no argument
    Personas,
    Tasks,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();
        match (name.as_str(), arg) {
            ("yes" | "y", _) => Self::Confirm,
            ("switch", _) => Self::ConfirmWithSwitch,
            ("no" | "n", _) => Self::Cancel,
            ("mode", Some(mode)) => match mode.parse() {
                Ok(mode) => Self::Mode(mode),
                Err(e) => Self::Invalid(e),
            },
            ("persona", Some(persona)) => match persona.parse() {
                Ok(persona) => Self::Persona(persona),
                Err(e) => Self::Invalid(e),
            },
            ("persona", None) => Self::Personas,
            ("mode", None) => Self::Invalid(format!("/{} needs an argument", name)),
            ("tasks", _) => Self::Tasks,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit" | "q", _) => Self::Quit,
            _ => Self::Invalid(format!("Unknown command: /{}", name)),
        }
    }
}

pub const REPL_HELP: &str = "\
/yes                 create the pending tasks
/switch              switch to the suggested mode, then create them
/no                  discard the pending tasks
/mode solo|team      change the operating mode
/persona [NAME]      list personas, or pick plan, gamer, coach, mentor
/tasks               list created tasks
/help                show this help
/quit                leave";
