//! Assistant personas

use serde::{Deserialize, Serialize};

use crate::domain::OperatingMode;

/// Chat personality; only Plan runs task extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Plan,
    Gamer,
    Coach,
    Mentor,
}

impl Persona {
    pub const ALL: [Persona; 4] = [Persona::Plan, Persona::Gamer, Persona::Coach, Persona::Mentor];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plan => "Plan Mode",
            Self::Gamer => "Gamer Mode",
            Self::Coach => "Coach Mode",
            Self::Mentor => "Mentor Mode",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Plan => "Tell me your tasks and I'll create them with schedules",
            Self::Gamer => "Gamify your tasks with XP, levels, and achievements",
            Self::Coach => "Get motivated with energetic coaching and accountability",
            Self::Mentor => "Thoughtful guidance and strategic career advice",
        }
    }

    /// Opening line when the persona is selected
    pub fn greeting(&self, mode: OperatingMode) -> &'static str {
        match (self, mode) {
            (Self::Plan, OperatingMode::Team) => {
                "👥 Ready to organize your team! Tell me the tasks and I'll help distribute them."
            }
            (Self::Plan, OperatingMode::Solo) => {
                "📅 Let's organize your tasks! Just tell me what you need to get done, and I'll create task blocks for you."
            }
            (Self::Gamer, _) => "🎮 Level up! Ready to crush some quests today?",
            (Self::Coach, _) => "💪 Let's DO THIS! What goals are we smashing today?",
            (Self::Mentor, _) => "🎓 Let's think strategically about your growth path.",
        }
    }

    /// Fixed reply for personas that do not extract tasks
    pub fn canned_reply(&self) -> Option<&'static str> {
        match self {
            Self::Plan => None,
            Self::Gamer => Some("🎯 Quest accepted! +50 XP. Ready to level up?"),
            Self::Coach => Some("🔥 THAT'S THE SPIRIT! Let's crush this together!"),
            Self::Mentor => Some("📚 Great question. Let me share some strategic insights..."),
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plan => write!(f, "plan"),
            Self::Gamer => write!(f, "gamer"),
            Self::Coach => write!(f, "coach"),
            Self::Mentor => write!(f, "mentor"),
        }
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plan" => Ok(Self::Plan),
            "gamer" => Ok(Self::Gamer),
            "coach" => Ok(Self::Coach),
            "mentor" => Ok(Self::Mentor),
            other => Err(format!("unknown persona: {}", other)),
        }
    }
}
