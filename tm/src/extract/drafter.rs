//! Task Drafter
//!
//! Normalizes one raw match into a TaskDraft and decides its bucket.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::classify::{Bucket, IntentSignals};
use super::matcher::RawMatch;
use crate::domain::{CURRENT_USER, Category, TaskDraft, TaskStatus};

/// Maximum title length in characters, ellipsis included
pub const MAX_TITLE_CHARS: usize = 60;

const ELLIPSIS: &str = "...";

const BUSINESS_KEYWORDS: &[&str] = &[
    "meeting",
    "database",
    "api",
    "ai",
    "logic",
    "chatbot",
    "integration",
    "ui",
    "front end",
    "presentation",
    "report",
];

static ALIAS_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)i\s*\(([^)]+)\)").expect("alias pattern is valid"));

static ALIAS_LEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{Lu}\p{Ll}+)\s+(?:has|have|completed|is|working)").expect("leading alias pattern is valid")
});

/// Per-message facts the drafter needs beyond the match itself
#[derive(Debug, Clone, Default)]
pub struct DraftContext {
    /// Name the speaker used for themselves, e.g. "Lahar" in "I (Lahar) ..."
    pub user_alias: Option<String>,
    pub signals: IntentSignals,
    /// Position of this match among the fallback matches
    pub fallback_index: usize,
}

/// Turns raw matches into drafts
#[derive(Debug, Clone, Default)]
pub struct Drafter {
    roster: Vec<String>,
    current_user: Option<String>,
}

impl Drafter {
    /// `roster` feeds round-robin assignment; `current_user` is an extra
    /// name that always means "You".
    pub fn new(roster: Vec<String>, current_user: Option<String>) -> Self {
        debug!(roster_len = roster.len(), ?current_user, "Drafter::new: called");
        Self { roster, current_user }
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Normalize a match; None when the description cannot make a title
    pub fn draft(&self, raw: &RawMatch, ctx: &DraftContext) -> Option<(Bucket, TaskDraft)> {
        debug!(?raw, "Drafter::draft: called");
        let description = raw.description().trim();
        let title = make_title(description)?;
        let category = infer_category(description);

        match raw {
            RawMatch::Attributed { person, window, .. } => {
                let status = infer_status(window, TaskStatus::InProgress);
                let draft = TaskDraft {
                    title,
                    description: format!("{}: {}", person, description),
                    category,
                    assignee: person.clone(),
                    status,
                };
                if self.is_current_user(person, ctx) {
                    debug!(%person, "Drafter::draft: attributed match is the current user");
                    Some((
                        Bucket::Solo,
                        TaskDraft {
                            assignee: CURRENT_USER.to_string(),
                            ..draft
                        },
                    ))
                } else {
                    Some((Bucket::Team, draft))
                }
            }
            RawMatch::SelfReport { window, .. } => Some((
                Bucket::Solo,
                TaskDraft {
                    title,
                    description: format!("Personal task: {}", description),
                    category,
                    assignee: CURRENT_USER.to_string(),
                    status: infer_status(window, TaskStatus::InProgress),
                },
            )),
            RawMatch::Fallback { .. } => {
                let (bucket, assignee) = self.fallback_assignee(ctx);
                Some((
                    bucket,
                    TaskDraft {
                        title,
                        description: format!("AI-created task: {}", description),
                        category,
                        assignee,
                        status: TaskStatus::Pending,
                    },
                ))
            }
        }
    }

    /// Whether a captured name refers to the person typing
    fn is_current_user(&self, person: &str, ctx: &DraftContext) -> bool {
        let person = person.to_lowercase();
        person == CURRENT_USER.to_lowercase()
            || ctx.user_alias.as_ref().is_some_and(|a| a.to_lowercase() == person)
            || self.current_user.as_ref().is_some_and(|u| u.to_lowercase() == person)
    }

    /// Solo wording keeps fallback tasks with the speaker; otherwise they are
    /// dealt round-robin over the roster.
    fn fallback_assignee(&self, ctx: &DraftContext) -> (Bucket, String) {
        if ctx.signals.is_solo_task || self.roster.is_empty() {
            debug!("Drafter::fallback_assignee: solo");
            return (Bucket::Solo, CURRENT_USER.to_string());
        }
        let assignee = self.roster[ctx.fallback_index % self.roster.len()].clone();
        debug!(%assignee, index = ctx.fallback_index, "Drafter::fallback_assignee: round-robin");
        (Bucket::Team, assignee)
    }
}

/// Name the speaker gives themselves, from "I (Name)" anywhere or a leading
/// "Name has/have/completed/is/working"
pub fn detect_user_alias(message: &str) -> Option<String> {
    ALIAS_PAREN_RE
        .captures(message)
        .or_else(|| ALIAS_LEADING_RE.captures(message))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|alias| !alias.is_empty())
}

/// Capitalize the first character and cap the length at 60 characters
pub fn make_title(description: &str) -> Option<String> {
    let description = description.trim();
    let mut chars = description.chars();
    let first = chars.next()?;
    let title: String = first.to_uppercase().chain(chars).collect();

    if title.chars().count() <= MAX_TITLE_CHARS {
        return Some(title);
    }
    let kept: String = title.chars().take(MAX_TITLE_CHARS - ELLIPSIS.len()).collect();
    Some(format!("{}{}", kept, ELLIPSIS))
}

/// Business when the description mentions a work keyword
pub fn infer_category(description: &str) -> Category {
    let lower = description.to_lowercase();
    if BUSINESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Business
    } else {
        Category::Personal
    }
}

/// Completion words win over progress words; otherwise `default`
pub fn infer_status(window: &str, default: TaskStatus) -> TaskStatus {
    let window = window.to_lowercase();
    if window.contains("completed") || window.contains("done with") || window.contains("finished") {
        TaskStatus::Completed
    } else if window.contains("working on") {
        TaskStatus::InProgress
    } else {
        default
    }
}
