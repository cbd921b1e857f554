//! Operating modes
//!
//! `OperatingMode` is owned by the host; the core only reads it and may
//! ask for a change. `SuggestedMode` is derived from extracted content.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The host application's operating context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    #[default]
    Solo,
    Team,
}

impl OperatingMode {
    /// Capitalized name used in reply copy ("Solo", "Team")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Solo => "Solo",
            Self::Team => "Team",
        }
    }
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solo => write!(f, "solo"),
            Self::Team => write!(f, "team"),
        }
    }
}

impl std::str::FromStr for OperatingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solo" => Ok(Self::Solo),
            "team" => Ok(Self::Team),
            _ => Err(format!("Unknown mode: {} (expected solo or team)", s)),
        }
    }
}

/// Mode suggested by what was actually extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedMode {
    Solo,
    Team,
    Both,
    #[default]
    None,
}

impl SuggestedMode {
    /// Derive from bucket non-emptiness
    pub fn from_buckets(has_solo: bool, has_team: bool) -> Self {
        debug!(has_solo, has_team, "SuggestedMode::from_buckets: called");
        match (has_solo, has_team) {
            (true, true) => Self::Both,
            (false, true) => Self::Team,
            (true, false) => Self::Solo,
            (false, false) => Self::None,
        }
    }

    /// The single operating mode this suggestion points at, if any
    pub fn as_operating_mode(&self) -> Option<OperatingMode> {
        match self {
            Self::Solo => Some(OperatingMode::Solo),
            Self::Team => Some(OperatingMode::Team),
            Self::Both | Self::None => None,
        }
    }
}

impl std::fmt::Display for SuggestedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solo => write!(f, "solo"),
            Self::Team => write!(f, "team"),
            Self::Both => write!(f, "both"),
            Self::None => write!(f, "none"),
        }
    }
}
