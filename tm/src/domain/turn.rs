//! ConversationTurn - one entry of the append-only chat transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PendingBatch;

/// A file attached to a user message, passed through untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub text: String,
    pub is_from_user: bool,
    pub is_confirmation_prompt: bool,
    /// Confirmation prompt lets the user switch mode before committing
    #[serde(default)]
    pub offers_switch: bool,
    /// Snapshot of the batch a confirmation prompt asks about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_batch: Option<PendingBatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// A message typed by the user
    pub fn user(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        let mut text = text.into();
        debug!(attachment_count = attachments.len(), "ConversationTurn::user: called");
        if !attachments.is_empty() {
            text.push_str(&format!("\n📎 Attached {} file(s)", attachments.len()));
        }
        Self {
            text,
            is_from_user: true,
            is_confirmation_prompt: false,
            offers_switch: false,
            attached_batch: None,
            attachments,
            timestamp: Utc::now(),
        }
    }

    /// A plain assistant reply
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_from_user: false,
            is_confirmation_prompt: false,
            offers_switch: false,
            attached_batch: None,
            attachments: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// An assistant reply asking the user to confirm a batch
    pub fn confirmation(text: impl Into<String>, batch: PendingBatch, offers_switch: bool) -> Self {
        debug!(batch_id = %batch.id, offers_switch, "ConversationTurn::confirmation: called");
        Self {
            text: text.into(),
            is_from_user: false,
            is_confirmation_prompt: true,
            offers_switch,
            attached_batch: Some(batch),
            attachments: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}
