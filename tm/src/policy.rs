//! Confirmation Policy
//!
//! Pure functions of a ParseResult and the host's current mode. Decides
//! whether drafts need a round trip and which prompt copy to use.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{OperatingMode, ParseResult, SuggestedMode};

/// More drafts than this always require confirmation
pub const AUTO_COMMIT_LIMIT: usize = 5;

/// Which confirmation prompt to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptVariant {
    /// Only team drafts, host is in solo mode
    TeamInSoloMode,
    /// Only solo drafts, host is in team mode
    SoloInTeamMode,
    /// More than AUTO_COMMIT_LIMIT drafts
    TooManyTasks,
    Generic,
}

impl PromptVariant {
    /// Template used to render this prompt
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::TeamInSoloMode => "confirm-team-in-solo",
            Self::SoloInTeamMode => "confirm-solo-in-team",
            Self::TooManyTasks => "confirm-too-many",
            Self::Generic => "confirm-generic",
        }
    }

    /// Whether the prompt offers a mode switch
    pub fn offers_switch(&self) -> bool {
        matches!(self, Self::TeamInSoloMode | Self::SoloInTeamMode)
    }
}

/// Outcome of the policy for one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub needs_confirmation: bool,
    pub variant: Option<PromptVariant>,
    /// Intent wording disagrees with what was extracted
    pub signal_mismatch: bool,
}

impl Decision {
    /// One-line human-readable reason
    pub fn summary(&self, result: &ParseResult, mode: OperatingMode) -> String {
        let n = result.total();
        match self.variant {
            None if n == 0 => "no tasks found".to_string(),
            None => format!("{} task(s) fit {} mode, creating directly", n, mode),
            Some(PromptVariant::TeamInSoloMode) => format!("{} team task(s) found while in solo mode", n),
            Some(PromptVariant::SoloInTeamMode) => format!("{} personal task(s) found while in team mode", n),
            Some(PromptVariant::TooManyTasks) => format!("{} tasks is more than {}", n, AUTO_COMMIT_LIMIT),
            Some(PromptVariant::Generic) => format!("{} task(s) span solo and team", n),
        }
    }
}

/// True when the drafts should not be created without asking
pub fn needs_confirmation(result: &ParseResult, mode: OperatingMode) -> bool {
    let needed = result.suggested_mode == SuggestedMode::Both
        || (!result.team_tasks.is_empty() && mode == OperatingMode::Solo)
        || (!result.solo_tasks.is_empty() && mode == OperatingMode::Team)
        || result.total() > AUTO_COMMIT_LIMIT;
    debug!(%mode, total = result.total(), needed, "needs_confirmation: computed");
    needed
}

/// Prompt copy for a result that needs confirmation; None otherwise
///
/// First match wins: team-in-solo, solo-in-team, too many, generic.
pub fn prompt_variant(result: &ParseResult, mode: OperatingMode) -> Option<PromptVariant> {
    if !needs_confirmation(result, mode) {
        return None;
    }
    let has_solo = !result.solo_tasks.is_empty();
    let has_team = !result.team_tasks.is_empty();

    let variant = if mode == OperatingMode::Solo && has_team && !has_solo {
        PromptVariant::TeamInSoloMode
    } else if mode == OperatingMode::Team && has_solo && !has_team {
        PromptVariant::SoloInTeamMode
    } else if result.total() > AUTO_COMMIT_LIMIT {
        PromptVariant::TooManyTasks
    } else {
        PromptVariant::Generic
    };
    debug!(?variant, "prompt_variant: selected");
    Some(variant)
}

/// Full policy decision for a result
pub fn decide(result: &ParseResult, mode: OperatingMode) -> Decision {
    let signals = crate::extract::IntentSignals {
        is_team_task: result.is_team_task,
        is_solo_task: result.is_solo_task,
    };
    Decision {
        needs_confirmation: needs_confirmation(result, mode),
        variant: prompt_variant(result, mode),
        signal_mismatch: signals.disagrees_with(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CURRENT_USER, Category, TaskDraft, TaskStatus};

    fn draft(assignee: &str) -> TaskDraft {
        TaskDraft {
            title: "Do the thing".to_string(),
            description: "do the thing".to_string(),
            category: Category::Personal,
            assignee: assignee.to_string(),
            status: TaskStatus::Pending,
        }
    }

    fn result(solo: usize, team: usize) -> ParseResult {
        ParseResult {
            solo_tasks: (0..solo).map(|_| draft(CURRENT_USER)).collect(),
            team_tasks: (0..team).map(|_| draft("Rana Kumar")).collect(),
            suggested_mode: SuggestedMode::from_buckets(solo > 0, team > 0),
            ..Default::default()
        }
    }

    #[test]
    fn test_matching_mode_needs_no_confirmation() {
        assert!(!needs_confirmation(&result(2, 0), OperatingMode::Solo));
        assert!(!needs_confirmation(&result(0, 3), OperatingMode::Team));
        assert!(!needs_confirmation(&result(0, 0), OperatingMode::Solo));
        assert_eq!(prompt_variant(&result(2, 0), OperatingMode::Solo), None);
    }

    #[test]
    fn test_both_always_confirms() {
        for mode in [OperatingMode::Solo, OperatingMode::Team] {
            assert!(needs_confirmation(&result(1, 1), mode));
            assert_eq!(prompt_variant(&result(1, 1), mode), Some(PromptVariant::Generic));
        }
    }

    #[test]
    fn test_mode_mismatch() {
        assert_eq!(
            prompt_variant(&result(0, 2), OperatingMode::Solo),
            Some(PromptVariant::TeamInSoloMode)
        );
        assert_eq!(
            prompt_variant(&result(1, 0), OperatingMode::Team),
            Some(PromptVariant::SoloInTeamMode)
        );
    }

    #[test]
    fn test_count_over_limit_confirms_regardless_of_mode() {
        assert!(needs_confirmation(&result(6, 0), OperatingMode::Solo));
        assert!(needs_confirmation(&result(0, 6), OperatingMode::Team));
        assert!(!needs_confirmation(&result(5, 0), OperatingMode::Solo));
        assert_eq!(
            prompt_variant(&result(6, 0), OperatingMode::Solo),
            Some(PromptVariant::TooManyTasks)
        );
        assert_eq!(
            prompt_variant(&result(4, 3), OperatingMode::Solo),
            Some(PromptVariant::TooManyTasks)
        );
    }

    #[test]
    fn test_mismatch_beats_count() {
        assert_eq!(
            prompt_variant(&result(0, 8), OperatingMode::Solo),
            Some(PromptVariant::TeamInSoloMode)
        );
    }

    #[test]
    fn test_decide_reports_signal_mismatch() {
        let mut r = result(1, 0);
        r.is_team_task = true;
        let decision = decide(&r, OperatingMode::Solo);

        assert!(!decision.needs_confirmation);
        assert!(decision.signal_mismatch);
        assert_eq!(decision.summary(&r, OperatingMode::Solo), "1 task(s) fit solo mode, creating directly");
    }

    #[test]
    fn test_template_names_and_switch() {
        assert!(PromptVariant::TeamInSoloMode.offers_switch());
        assert!(!PromptVariant::Generic.offers_switch());
        assert_eq!(PromptVariant::TooManyTasks.template_name(), "confirm-too-many");
    }
}
