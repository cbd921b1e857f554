//! Taskmate configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{OperatingMode, Schedule};

/// Main Taskmate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when no --log-level flag is given
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Chat and extraction settings
    pub chat: ChatConfig,

    /// JSONL transcript output
    pub transcript: TranscriptConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Roster names feed assignee resolution, so blanks and duplicates are
    /// rejected up front.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in &self.chat.roster {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(eyre::eyre!("chat.roster contains an empty name"));
            }
            if !seen.insert(trimmed.to_lowercase()) {
                return Err(eyre::eyre!("chat.roster contains duplicate name: {}", trimmed));
            }
        }
        if let Some(user) = &self.chat.current_user
            && user.trim().is_empty()
        {
            return Err(eyre::eyre!("chat.current-user must not be empty when set"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .taskmate.yml
        let local_config = PathBuf::from(".taskmate.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/taskmate/taskmate.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("taskmate").join("taskmate.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Chat session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Name the user goes by; attributed matches naming it become solo drafts
    #[serde(rename = "current-user")]
    pub current_user: Option<String>,

    /// Known team members, in round-robin order
    pub roster: Vec<String>,

    /// Pause between a mode-switch request and the commit, in milliseconds
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Mode the in-memory host starts in
    #[serde(rename = "default-mode")]
    pub default_mode: OperatingMode,

    /// Schedule stand-ins attached at commit
    pub placeholder: PlaceholderConfig,

    /// Illustrative image attached to every committed draft
    #[serde(rename = "artwork-url")]
    pub artwork_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            current_user: None,
            roster: ["Alice Chen", "Marcus Johnson", "Rana Kumar", "Suman Patel", "Suman", "Harshith", "Lahar"]
                .into_iter()
                .map(String::from)
                .collect(),
            settle_delay_ms: 800,
            default_mode: OperatingMode::Solo,
            placeholder: PlaceholderConfig::default(),
            artwork_url: "https://images.unsplash.com/photo-1484480974693-6ca0a78fb36b?w=400".to_string(),
        }
    }
}

impl ChatConfig {
    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_delay_ms)
    }
}

/// Placeholder schedule strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    #[serde(rename = "scheduled-date")]
    pub scheduled_date: String,

    #[serde(rename = "scheduled-time")]
    pub scheduled_time: String,

    pub deadline: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        let schedule = Schedule::default();
        Self {
            scheduled_date: schedule.scheduled_date,
            scheduled_time: schedule.scheduled_time,
            deadline: schedule.deadline,
        }
    }
}

impl PlaceholderConfig {
    pub fn to_schedule(&self) -> Schedule {
        Schedule {
            scheduled_date: self.scheduled_date.clone(),
            scheduled_time: self.scheduled_time.clone(),
            deadline: self.deadline.clone(),
        }
    }
}

/// Transcript log configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Write every turn to a JSONL file
    pub enabled: bool,

    /// Output directory (default: <data_local_dir>/taskmate/transcripts)
    pub dir: Option<PathBuf>,
}

impl TranscriptConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskmate")
                .join("transcripts"),
        }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory of .pmt files that override the embedded templates
    pub dir: Option<String>,
}

impl PromptsConfig {
    /// Expand the override directory (resolve ~/)
    pub fn expanded_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.as_deref()?;
        if let Some(rest) = dir.strip_prefix("~/") {
            dirs::home_dir().map(|home| home.join(rest))
        } else {
            Some(PathBuf::from(dir))
        }
    }
}
