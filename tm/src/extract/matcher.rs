//! Entity Extractor
//!
//! An ordered chain of pattern matchers. Each matcher scans the whole
//! message left to right and yields non-overlapping raw matches tagged by
//! kind. Keywords match case-insensitively; captured text keeps its case.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

/// Descriptions shorter than this (after trimming) are dropped
pub const MIN_DESCRIPTION_CHARS: usize = 4;

/// Context radius (chars each side) for attributed matches
pub const ATTRIBUTED_WINDOW: usize = 50;

/// Context radius (chars each side) for self matches
pub const SELF_WINDOW: usize = 30;

/// "<Name> is/has/have/are working on|completed|done with|finishing <desc>"
static ATTRIBUTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+)?)\s+(?i:is|has|have|are)\s+(?i:working on|completed|done with|finishing)\s+([^,.;]+)",
    )
    .expect("attributed pattern is valid")
});

/// "I [(Name)] have/has/am completed|done|finished|working on <desc>"
///
/// The leading `i` is not word-bounded, so a name ending in "i" followed by
/// "has completed" also matches here.
static SELF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)i(?:\s*\(([^)]+)\))?\s+(?:have|has|am)\s+(?:completed|done|finished|working on)\s+([^,.;]+)")
        .expect("self pattern is valid")
});

/// "need to|have to|should|must|want to|going to <desc>"
static FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:need to|have to|should|must|want to|going to)\s+([^,.;]+)").expect("fallback pattern is valid")
});

/// Punctuation or a conjunction that ends a clause
static CLAUSE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[,.;!?\n]|\b(?:and|but)\b").expect("clause pattern is valid"));

/// A raw extraction match, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawMatch {
    /// A named person reporting progress
    Attributed {
        person: String,
        description: String,
        window: String,
    },
    /// The speaker reporting their own progress
    SelfReport {
        alias: Option<String>,
        description: String,
        window: String,
    },
    /// A bare intention phrase with nobody attached
    Fallback { description: String },
}

impl RawMatch {
    pub fn description(&self) -> &str {
        match self {
            Self::Attributed { description, .. }
            | Self::SelfReport { description, .. }
            | Self::Fallback { description } => description,
        }
    }

    /// Lowercased text around the match, empty for fallback phrases
    pub fn window(&self) -> &str {
        match self {
            Self::Attributed { window, .. } | Self::SelfReport { window, .. } => window,
            Self::Fallback { .. } => "",
        }
    }
}

/// A single pattern pass over a message
pub trait Matcher: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// All matches in the message, in order of appearance
    fn find(&self, message: &str) -> Vec<RawMatch>;
}

/// Matches "<Name> is working on ..." style progress reports
#[derive(Debug, Default)]
pub struct AttributedMatcher;

impl Matcher for AttributedMatcher {
    fn name(&self) -> &'static str {
        "attributed"
    }

    fn find(&self, message: &str) -> Vec<RawMatch> {
        debug!(len = message.len(), "AttributedMatcher::find: called");
        ATTRIBUTED_RE
            .captures_iter(message)
            .filter_map(|caps| {
                let description = kept_description(&caps, 2)?;
                let whole = caps.get(0)?;
                Some(RawMatch::Attributed {
                    person: caps.get(1)?.as_str().trim().to_string(),
                    description,
                    window: context_window(message, whole.start(), whole.end(), ATTRIBUTED_WINDOW),
                })
            })
            .collect()
    }
}

/// Matches first-person progress reports
#[derive(Debug, Default)]
pub struct SelfMatcher;

impl Matcher for SelfMatcher {
    fn name(&self) -> &'static str {
        "self"
    }

    fn find(&self, message: &str) -> Vec<RawMatch> {
        debug!(len = message.len(), "SelfMatcher::find: called");
        SELF_RE
            .captures_iter(message)
            .filter_map(|caps| {
                let description = kept_description(&caps, 2)?;
                let whole = caps.get(0)?;
                Some(RawMatch::SelfReport {
                    alias: caps.get(1).map(|m| m.as_str().trim().to_string()),
                    description,
                    window: context_window(message, whole.start(), whole.end(), SELF_WINDOW),
                })
            })
            .collect()
    }
}

/// Matches "need to ...", "should ..." intention phrases
#[derive(Debug, Default)]
pub struct FallbackMatcher;

impl Matcher for FallbackMatcher {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn find(&self, message: &str) -> Vec<RawMatch> {
        debug!(len = message.len(), "FallbackMatcher::find: called");
        FALLBACK_RE
            .captures_iter(message)
            .filter_map(|caps| kept_description(&caps, 1).map(|description| RawMatch::Fallback { description }))
            .collect()
    }
}

/// Ordered matcher chain with a fallback pass
///
/// The fallback pass only runs when every primary matcher came back empty;
/// its results are never merged with primary results. Primary results are
/// not deduplicated against each other.
pub struct Extractor {
    primary: Vec<Box<dyn Matcher>>,
    fallback: Box<dyn Matcher>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(
            vec![Box::new(AttributedMatcher), Box::new(SelfMatcher)],
            Box::new(FallbackMatcher),
        )
    }
}

impl Extractor {
    pub fn new(primary: Vec<Box<dyn Matcher>>, fallback: Box<dyn Matcher>) -> Self {
        debug!(primary_count = primary.len(), "Extractor::new: called");
        Self { primary, fallback }
    }

    /// Run the chain over a message
    pub fn extract(&self, message: &str) -> Vec<RawMatch> {
        debug!(len = message.len(), "Extractor::extract: called");
        let mut matches = Vec::new();
        for matcher in &self.primary {
            let found = matcher.find(message);
            debug!(matcher = matcher.name(), count = found.len(), "Extractor::extract: primary pass");
            matches.extend(found);
        }

        if matches.is_empty() {
            matches = self.fallback.find(message);
            debug!(
                matcher = self.fallback.name(),
                count = matches.len(),
                "Extractor::extract: fallback pass"
            );
        }

        matches
    }
}

/// Trimmed capture group, or None when it is too short to be a task
fn kept_description(caps: &Captures<'_>, group: usize) -> Option<String> {
    let description = caps.get(group)?.as_str().trim();
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        debug!(%description, "kept_description: dropping short description");
        return None;
    }
    Some(description.to_string())
}

/// Lowercased text of `message[start..end]` plus up to `radius` chars on
/// each side.
///
/// The surrounding text never crosses a clause boundary, so a status word
/// in a neighbouring clause cannot leak into this match.
pub fn context_window(message: &str, start: usize, end: usize, radius: usize) -> String {
    let head = &message[..start];
    let head_start = if radius == 0 {
        head.len()
    } else {
        head.char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let mut before = &head[head_start..];
    if let Some(last) = CLAUSE_BREAK_RE.find_iter(before).last() {
        before = &before[last.end()..];
    }

    let tail = &message[end..];
    let tail_end = tail.char_indices().nth(radius).map(|(i, _)| i).unwrap_or(tail.len());
    let mut after = &tail[..tail_end];
    if let Some(first) = CLAUSE_BREAK_RE.find(after) {
        after = &after[..first.start()];
    }

    format!("{}{}{}", before, &message[start..end], after).to_lowercase()
}
