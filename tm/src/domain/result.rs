//! ParseResult - output of the extraction pipeline for one message

use serde::{Deserialize, Serialize};

use super::{SuggestedMode, TaskDraft};

/// Drafts partitioned into solo and team buckets, plus intent signals
///
/// Invariant: `suggested_mode` always equals
/// `SuggestedMode::from_buckets(!solo_tasks.is_empty(), !team_tasks.is_empty())`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub solo_tasks: Vec<TaskDraft>,
    pub team_tasks: Vec<TaskDraft>,
    /// Message wording points at the team
    pub is_team_task: bool,
    /// Message wording points at the speaker
    pub is_solo_task: bool,
    pub suggested_mode: SuggestedMode,
    pub needs_confirmation: bool,
}

impl ParseResult {
    /// Total number of drafts across both buckets
    pub fn total(&self) -> usize {
        self.solo_tasks.len() + self.team_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All drafts, solo bucket first
    pub fn drafts(&self) -> impl Iterator<Item = &TaskDraft> {
        self.solo_tasks.iter().chain(self.team_tasks.iter())
    }

    /// Numbered task list, one draft per line
    pub fn task_list(&self) -> Vec<String> {
        self.drafts().enumerate().map(|(i, d)| d.list_line(i + 1)).collect()
    }
}
