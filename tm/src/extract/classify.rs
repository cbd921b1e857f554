//! Classifier
//!
//! Two independent readings of a message: intent wording (the boolean
//! signals) and actual extracted content (the buckets). They may disagree;
//! the suggested mode follows the buckets only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ParseResult, SuggestedMode, TaskDraft};

const TEAM_PHRASES: &[&str] = &["team", "assign to", "distribute", "split among", "divide between"];

const SOLO_PHRASES: &[&str] = &["i ", "i'", "my task", "my deadline", "help me", "remind me"];

/// Which bucket a draft lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Solo,
    Team,
}

/// Intent wording found in the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentSignals {
    pub is_team_task: bool,
    pub is_solo_task: bool,
}

impl IntentSignals {
    /// Scan a message for team and self wording
    pub fn scan(message: &str, roster: &[String]) -> Self {
        let lower = message.to_lowercase();
        let is_team_task = TEAM_PHRASES.iter().any(|p| lower.contains(p))
            || roster.iter().any(|name| lower.contains(&name.to_lowercase()));
        let is_solo_task = SOLO_PHRASES.iter().any(|p| lower.contains(p));
        debug!(is_team_task, is_solo_task, "IntentSignals::scan: computed");
        Self {
            is_team_task,
            is_solo_task,
        }
    }

    /// Wording and content point in different directions
    pub fn disagrees_with(&self, result: &ParseResult) -> bool {
        let team_without_team_drafts = self.is_team_task && !self.is_solo_task && result.team_tasks.is_empty();
        let solo_without_solo_drafts = self.is_solo_task && !self.is_team_task && result.solo_tasks.is_empty();
        !result.is_empty() && (team_without_team_drafts || solo_without_solo_drafts)
    }
}

/// Partition drafts into buckets and derive the suggested mode
///
/// `needs_confirmation` is left false; the confirmation policy fills it in.
pub fn classify(drafts: Vec<(Bucket, TaskDraft)>, signals: IntentSignals) -> ParseResult {
    debug!(count = drafts.len(), ?signals, "classify: called");
    let mut solo_tasks = Vec::new();
    let mut team_tasks = Vec::new();
    for (bucket, draft) in drafts {
        match bucket {
            Bucket::Solo => solo_tasks.push(draft),
            Bucket::Team => team_tasks.push(draft),
        }
    }

    let suggested_mode = SuggestedMode::from_buckets(!solo_tasks.is_empty(), !team_tasks.is_empty());
    debug!(
        solo = solo_tasks.len(),
        team = team_tasks.len(),
        %suggested_mode,
        "classify: bucketed"
    );

    ParseResult {
        solo_tasks,
        team_tasks,
        is_team_task: signals.is_team_task,
        is_solo_task: signals.is_solo_task,
        suggested_mode,
        needs_confirmation: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CURRENT_USER, Category, TaskStatus};

    fn roster() -> Vec<String> {
        vec!["Alice Chen".to_string(), "Harshith".to_string()]
    }

    fn draft(assignee: &str) -> TaskDraft {
        TaskDraft {
            title: "Something useful".to_string(),
            description: "something useful".to_string(),
            category: Category::Personal,
            assignee: assignee.to_string(),
            status: TaskStatus::Pending,
        }
    }

    #[test]
    fn test_team_signals() {
        assert!(IntentSignals::scan("Split among the group please", &roster()).is_team_task);
        assert!(IntentSignals::scan("ask harshith about it", &roster()).is_team_task);
        assert!(IntentSignals::scan("Our TEAM needs this", &[]).is_team_task);
        assert!(!IntentSignals::scan("water the plants", &roster()).is_team_task);
    }

    #[test]
    fn test_solo_signals() {
        assert!(IntentSignals::scan("I need to water the plants", &[]).is_solo_task);
        assert!(IntentSignals::scan("I'm late on my deadline", &[]).is_solo_task);
        assert!(IntentSignals::scan("please remind me tomorrow", &[]).is_solo_task);
        assert!(!IntentSignals::scan("Water the plants", &[]).is_solo_task);
    }

    #[test]
    fn test_classify_buckets_and_mode() {
        let drafts = vec![
            (Bucket::Team, draft("Alice Chen")),
            (Bucket::Solo, draft(CURRENT_USER)),
            (Bucket::Team, draft("Harshith")),
        ];
        let result = classify(drafts, IntentSignals::default());

        assert_eq!(result.solo_tasks.len(), 1);
        assert_eq!(result.team_tasks.len(), 2);
        assert_eq!(result.team_tasks[1].assignee, "Harshith");
        assert_eq!(result.suggested_mode, SuggestedMode::Both);
        assert!(!result.needs_confirmation);
    }

    #[test]
    fn test_classify_mode_ignores_signals() {
        let signals = IntentSignals {
            is_team_task: true,
            is_solo_task: false,
        };
        let result = classify(vec![(Bucket::Solo, draft(CURRENT_USER))], signals);

        assert_eq!(result.suggested_mode, SuggestedMode::Solo);
        assert!(result.is_team_task);
        assert!(signals.disagrees_with(&result));
    }

    #[test]
    fn test_classify_empty() {
        let result = classify(Vec::new(), IntentSignals::default());
        assert_eq!(result.suggested_mode, SuggestedMode::None);
        assert!(!IntentSignals::default().disagrees_with(&result));
    }
}
