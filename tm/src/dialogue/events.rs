//! Dialogue events and states

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Attachment, OperatingMode};
use crate::persona::Persona;

/// Input to the dialogue machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatEvent {
    MessageSubmitted {
        text: String,
        #[serde(default)]
        attachments: Vec<Attachment>,
    },
    /// The user accepted the pending batch
    ConfirmPressed { switch_mode: bool },
    CancelPressed,
    PersonaSelected { persona: Persona },
    /// The settle delay for a deferred commit has passed
    SettleElapsed { batch_id: Uuid },
}

impl ChatEvent {
    pub fn message(text: impl Into<String>) -> Self {
        ChatEvent::MessageSubmitted {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::MessageSubmitted { .. } => "message-submitted",
            ChatEvent::ConfirmPressed { .. } => "confirm-pressed",
            ChatEvent::CancelPressed => "cancel-pressed",
            ChatEvent::PersonaSelected { .. } => "persona-selected",
            ChatEvent::SettleElapsed { .. } => "settle-elapsed",
        }
    }
}

/// Where the dialogue stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingConfirmation,
    /// Mode switch requested, commit deferred
    SwitchingMode,
    Committing,
}

impl std::fmt::Display for DialogueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingConfirmation => write!(f, "awaiting-confirmation"),
            Self::SwitchingMode => write!(f, "switching-mode"),
            Self::Committing => write!(f, "committing"),
        }
    }
}

/// A deferred commit the caller must wake after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    pub batch_id: Uuid,
    pub target: OperatingMode,
    pub delay: Duration,
}

impl SettleTimer {
    /// The event to feed back once the delay has passed
    pub fn elapsed_event(&self) -> ChatEvent {
        ChatEvent::SettleElapsed {
            batch_id: self.batch_id,
        }
    }
}
