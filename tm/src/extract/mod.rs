//! Free-text task extraction
//!
//! Pipeline, leaves first:
//! - [`matcher`] - ordered pattern passes yielding raw matches
//! - [`drafter`] - raw match to normalized TaskDraft plus bucket
//! - [`classify`] - intent signals, buckets, suggested mode
//!
//! [`TaskParser`] runs the whole pipeline and applies the confirmation
//! policy. It is deterministic: the same message and mode always give the
//! same ParseResult.

pub mod classify;
pub mod drafter;
pub mod matcher;

use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::domain::{OperatingMode, ParseResult};
use crate::policy;

pub use classify::{Bucket, IntentSignals, classify};
pub use drafter::{DraftContext, Drafter, detect_user_alias, make_title};
pub use matcher::{Extractor, Matcher, RawMatch};

/// Stateless message parser
pub struct TaskParser {
    extractor: Extractor,
    drafter: Drafter,
}

impl TaskParser {
    pub fn new(extractor: Extractor, drafter: Drafter) -> Self {
        Self { extractor, drafter }
    }

    /// Default matcher chain with the roster and alias from config
    pub fn from_config(config: &ChatConfig) -> Self {
        debug!(roster_len = config.roster.len(), "TaskParser::from_config: called");
        Self::new(
            Extractor::default(),
            Drafter::new(config.roster.clone(), config.current_user.clone()),
        )
    }

    /// Extract, draft, classify, and decide whether to confirm
    pub fn parse(&self, message: &str, mode: OperatingMode) -> ParseResult {
        debug!(len = message.len(), %mode, "TaskParser::parse: called");
        let signals = IntentSignals::scan(message, self.drafter.roster());
        let user_alias = detect_user_alias(message);

        let mut fallback_index = 0;
        let mut drafts = Vec::new();
        for raw in self.extractor.extract(message) {
            let ctx = DraftContext {
                user_alias: user_alias.clone(),
                signals,
                fallback_index,
            };
            if matches!(raw, RawMatch::Fallback { .. }) {
                fallback_index += 1;
            }
            if let Some(drafted) = self.drafter.draft(&raw, &ctx) {
                drafts.push(drafted);
            }
        }

        let mut result = classify(drafts, signals);
        result.needs_confirmation = policy::needs_confirmation(&result, mode);
        info!(
            solo = result.solo_tasks.len(),
            team = result.team_tasks.len(),
            suggested_mode = %result.suggested_mode,
            needs_confirmation = result.needs_confirmation,
            "Parsed message"
        );
        result
    }
}

impl Default for TaskParser {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Parse with the default roster and no configured alias
pub fn parse_message(message: &str, mode: OperatingMode) -> ParseResult {
    TaskParser::default().parse(message, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CURRENT_USER, Category, SuggestedMode, TaskStatus};

    #[test]
    fn test_mixed_message_in_solo_mode() {
        let parser = TaskParser::default();
        let result = parser.parse(
            "I have completed the database migration and Alice Chen is working on the UI redesign",
            OperatingMode::Solo,
        );

        assert_eq!(result.solo_tasks.len(), 1);
        let solo = &result.solo_tasks[0];
        assert!(solo.title.starts_with("The database migration"));
        assert!(solo.title.chars().count() <= 60);
        assert_eq!(solo.category, Category::Business);
        assert_eq!(solo.assignee, CURRENT_USER);
        assert_eq!(solo.status, TaskStatus::Completed);

        assert_eq!(result.team_tasks.len(), 1);
        let team = &result.team_tasks[0];
        assert_eq!(team.title, "The UI redesign");
        assert_eq!(team.category, Category::Business);
        assert_eq!(team.assignee, "Alice Chen");
        assert_eq!(team.status, TaskStatus::InProgress);

        assert!(result.is_team_task);
        assert!(result.is_solo_task);
        assert_eq!(result.suggested_mode, SuggestedMode::Both);
        assert!(result.needs_confirmation);
    }

    #[test]
    fn test_fallback_single_solo_task() {
        let result = TaskParser::default().parse("I need to water the plants", OperatingMode::Solo);

        assert!(result.team_tasks.is_empty());
        assert_eq!(result.solo_tasks.len(), 1);
        let draft = &result.solo_tasks[0];
        assert_eq!(draft.title, "Water the plants");
        assert_eq!(draft.category, Category::Personal);
        assert_eq!(draft.assignee, CURRENT_USER);
        assert_eq!(draft.status, TaskStatus::Pending);
        assert_eq!(result.suggested_mode, SuggestedMode::Solo);
        assert!(!result.needs_confirmation);
    }

    #[test]
    fn test_no_match_is_empty() {
        let result = TaskParser::default().parse("Good morning!", OperatingMode::Team);
        assert!(result.is_empty());
        assert_eq!(result.suggested_mode, SuggestedMode::None);
        assert!(!result.needs_confirmation);
    }

    #[test]
    fn test_fallback_team_round_robin_over_roster() {
        let result = TaskParser::default().parse(
            "We need to update the database, should test the API, must review the designs",
            OperatingMode::Team,
        );

        let assignees: Vec<_> = result.team_tasks.iter().map(|d| d.assignee.as_str()).collect();
        assert_eq!(assignees, vec!["Alice Chen", "Marcus Johnson", "Rana Kumar"]);
        assert_eq!(result.suggested_mode, SuggestedMode::Team);
        assert!(!result.needs_confirmation);
    }

    #[test]
    fn test_leading_name_is_treated_as_speaker() {
        let result = TaskParser::default().parse("Rana has completed the onboarding doc", OperatingMode::Solo);

        assert!(result.team_tasks.is_empty());
        assert_eq!(result.solo_tasks.len(), 1);
        assert_eq!(result.solo_tasks[0].assignee, CURRENT_USER);
        assert_eq!(result.solo_tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_duplicate_matches_are_kept() {
        let result = TaskParser::default().parse("Well, Ravi has completed the release notes.", OperatingMode::Team);

        // One team draft for Ravi and one solo draft from the self pattern
        assert_eq!(result.team_tasks.len(), 1);
        assert_eq!(result.team_tasks[0].assignee, "Ravi");
        assert_eq!(result.solo_tasks.len(), 1);
        assert_eq!(result.solo_tasks[0].title, result.team_tasks[0].title);
        assert_eq!(result.suggested_mode, SuggestedMode::Both);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let parser = TaskParser::default();
        let msg = "Marcus Johnson is working on the API integration; I am working on the report";
        assert_eq!(parser.parse(msg, OperatingMode::Solo), parser.parse(msg, OperatingMode::Solo));
        assert_eq!(parse_message(msg, OperatingMode::Solo), parser.parse(msg, OperatingMode::Solo));
    }
}
