//! TaskDraft domain type
//!
//! An extracted, not-yet-persisted task proposal.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assignee used for drafts that belong to the person typing
pub const CURRENT_USER: &str = "You";

/// Task category inferred from the description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Business,
    #[default]
    Personal,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Business => write!(f, "Business"),
            Self::Personal => write!(f, "Personal"),
        }
    }
}

/// Task status inferred from the text around a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Marker appended to task list lines
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Pending => "",
            Self::InProgress => " 🔄",
            Self::Completed => " ✅",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// A normalized task proposal
///
/// Invariant: `title` is never empty and never longer than 60 characters,
/// including the `"..."` appended on truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub assignee: String,
    pub status: TaskStatus,
}

impl TaskDraft {
    /// One line of a numbered task list, e.g. `2. Ui redesign (Alice Chen) 🔄`
    pub fn list_line(&self, number: usize) -> String {
        debug!(number, title = %self.title, "TaskDraft::list_line: called");
        format!("{}. {} ({}){}", number, self.title, self.assignee, self.status.marker())
    }
}

/// Read-only view of an existing task, as returned by the host's task query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub assignee: String,
    pub status: TaskStatus,
}

impl TaskSnapshot {
    pub fn new(assignee: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            assignee: assignee.into(),
            status,
        }
    }
}
