//! Team workload analytics
//!
//! Per-member task counts plus a rough capacity estimate. The estimate
//! carries random jitter, so this branch is the one place a reply is not a
//! pure function of its input.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::domain::{TaskSnapshot, TaskStatus};

/// Capacity estimates never exceed this
pub const CAPACITY_CAP: f64 = 95.0;

/// Estimated percent per assigned task
const PER_TASK_PERCENT: f64 = 15.0;

/// Jitter is drawn from 0 up to (not including) this
const JITTER_PERCENT: f64 = 20.0;

/// One row of the workload table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLoad {
    pub name: String,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub capacity: u32,
    pub marker: &'static str,
}

/// Marker shown next to a member's capacity
pub fn capacity_marker(capacity: u32) -> &'static str {
    if capacity > 80 {
        "⚠️"
    } else if capacity > 60 {
        "✅"
    } else {
        "💚"
    }
}

/// True when a message with no drafts should get the workload reply
pub fn mentions_workload(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("team") || lower.contains("workload")
}

/// Build the workload table, busiest member first
///
/// Members appear once each; ties keep first-seen order.
pub fn analyze(snapshot: &[TaskSnapshot], rng: &mut impl Rng) -> Vec<MemberLoad> {
    debug!(tasks = snapshot.len(), "analyze: called");
    let mut names: Vec<&str> = Vec::new();
    for task in snapshot {
        if !names.contains(&task.assignee.as_str()) {
            names.push(&task.assignee);
        }
    }

    let mut members: Vec<MemberLoad> = names
        .into_iter()
        .map(|name| {
            let tasks: Vec<&TaskSnapshot> = snapshot.iter().filter(|t| t.assignee == name).collect();
            let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
            let total = tasks.len();
            let jitter = rng.random_range(0.0..JITTER_PERCENT);
            let capacity = (total as f64 * PER_TASK_PERCENT + jitter).min(CAPACITY_CAP).round() as u32;

            MemberLoad {
                name: name.to_string(),
                total,
                completed: count(TaskStatus::Completed),
                in_progress: count(TaskStatus::InProgress),
                pending: count(TaskStatus::Pending),
                capacity,
                marker: capacity_marker(capacity),
            }
        })
        .collect();

    members.sort_by(|a, b| b.capacity.cmp(&a.capacity));
    members
}
