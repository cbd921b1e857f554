//! PendingBatch and commit-time draft enrichment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{ParseResult, SuggestedMode, TaskDraft};

/// Schedule stand-ins attached to every draft in a batch
///
/// Real scheduling is not done here; these are fixed placeholder strings
/// taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub deadline: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            scheduled_date: "Nov 10".to_string(),
            scheduled_time: "10:00 AM".to_string(),
            deadline: "Nov 15".to_string(),
        }
    }
}

/// A draft with its placeholder schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDraft {
    #[serde(flatten)]
    pub draft: TaskDraft,
    #[serde(flatten)]
    pub schedule: Schedule,
}

/// The drafts awaiting a single confirm/cancel decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBatch {
    pub id: Uuid,
    pub suggested_mode: SuggestedMode,
    pub items: Vec<ScheduledDraft>,
    pub created_at: DateTime<Utc>,
}

impl PendingBatch {
    /// Build a batch from every draft in a parse result, solo bucket first
    pub fn from_result(result: &ParseResult, schedule: &Schedule) -> Self {
        debug!(total = result.total(), suggested_mode = %result.suggested_mode, "PendingBatch::from_result: called");
        let items = result
            .drafts()
            .map(|draft| ScheduledDraft {
                draft: draft.clone(),
                schedule: schedule.clone(),
            })
            .collect();

        Self {
            id: Uuid::now_v7(),
            suggested_mode: result.suggested_mode,
            items,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Numbered task list, one item per line
    pub fn task_list(&self) -> Vec<String> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| item.draft.list_line(i + 1))
            .collect()
    }

    /// Attach artwork to every item, producing what the task sink receives
    pub fn enrich(&self, image_url: &str) -> Vec<EnrichedTaskDraft> {
        debug!(batch_id = %self.id, len = self.len(), "PendingBatch::enrich: called");
        self.items
            .iter()
            .map(|item| EnrichedTaskDraft {
                image_query: image_query(&item.draft.title).to_string(),
                image_url: image_url.to_string(),
                item: item.clone(),
            })
            .collect()
    }
}

/// A scheduled draft with an illustrative image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTaskDraft {
    #[serde(flatten)]
    pub item: ScheduledDraft,
    pub image_url: String,
    pub image_query: String,
}

impl EnrichedTaskDraft {
    pub fn draft(&self) -> &TaskDraft {
        &self.item.draft
    }
}

/// Pick a stock-image search phrase from keywords in the title
pub fn image_query(title: &str) -> &'static str {
    const QUERIES: &[(&[&str], &str)] = &[
        (&["design", "ui", "ux"], "design workspace"),
        (&["code", "programming", "develop"], "coding programming"),
        (&["meeting", "presentation"], "business meeting"),
        (&["write", "article", "blog"], "writing workspace"),
        (&["marketing", "social media"], "digital marketing"),
        (&["fitness", "workout", "gym"], "fitness workout"),
        (&["study", "learn", "course"], "studying learning"),
        (&["photo"], "photography camera"),
        (&["video", "editing"], "video editing"),
        (&["research"], "research workspace"),
        (&["review", "feedback"], "review feedback"),
        (&["database", "data"], "data analytics"),
        (&["test", "qa"], "software testing"),
        (&["documentation", "docs"], "documentation writing"),
    ];

    let title = title.to_lowercase();
    QUERIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map(|(_, query)| *query)
        .unwrap_or("productivity task")
}
