//! Host collaborator contracts
//!
//! The dialogue core never owns tasks, the operating mode, or the rendered
//! transcript. It reaches the host application through these traits. Every
//! call is fire-and-forget from the core's point of view: a returned error
//! propagates, nothing else from the host is consumed.
//!
//! [`MemoryHost`] implements all of them in memory for the CLI and tests.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::domain::{ConversationTurn, EnrichedTaskDraft, OperatingMode, TaskSnapshot};
use crate::error::HostError;

/// Read of the host's current operating mode
pub trait ModeProvider: Send + Sync {
    fn current_mode(&self) -> OperatingMode;
}

/// Asks the host to change its operating mode; the core does not wait for it
pub trait ModeSwitcher: Send + Sync {
    fn request_mode_switch(&self, mode: OperatingMode) -> Result<(), HostError>;
}

/// Receives one committed batch per call
pub trait TaskSink: Send + Sync {
    fn create_tasks(&self, batch: Vec<EnrichedTaskDraft>) -> Result<(), HostError>;
}

/// Append-only transcript emission
pub trait TranscriptSink: Send + Sync {
    fn append(&self, turn: &ConversationTurn) -> Result<(), HostError>;
}

/// Existing tasks, used only by the workload branch
pub trait TaskQuery: Send + Sync {
    fn snapshot(&self) -> Result<Vec<TaskSnapshot>, HostError>;
}

/// The set of collaborators a dialogue runs against
///
/// Only the mode provider is required. A missing switcher or task sink
/// degrades the dialogue to read-only acknowledgements.
#[derive(Clone)]
pub struct Collaborators {
    pub mode: Arc<dyn ModeProvider>,
    pub switcher: Option<Arc<dyn ModeSwitcher>>,
    pub tasks: Option<Arc<dyn TaskSink>>,
    pub transcript: Vec<Arc<dyn TranscriptSink>>,
    pub query: Option<Arc<dyn TaskQuery>>,
}

impl Collaborators {
    pub fn new(mode: Arc<dyn ModeProvider>) -> Self {
        Self {
            mode,
            switcher: None,
            tasks: None,
            transcript: Vec::new(),
            query: None,
        }
    }

    pub fn with_switcher(mut self, switcher: Arc<dyn ModeSwitcher>) -> Self {
        self.switcher = Some(switcher);
        self
    }

    pub fn with_task_sink(mut self, tasks: Arc<dyn TaskSink>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn with_transcript(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.transcript.push(sink);
        self
    }

    pub fn with_query(mut self, query: Arc<dyn TaskQuery>) -> Self {
        self.query = Some(query);
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("mode", &self.mode.current_mode())
            .field("switcher", &self.switcher.is_some())
            .field("tasks", &self.tasks.is_some())
            .field("transcript", &self.transcript.len())
            .field("query", &self.query.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    mode: OperatingMode,
    tasks: Vec<EnrichedTaskDraft>,
    turns: Vec<ConversationTurn>,
    switch_requests: Vec<OperatingMode>,
    create_calls: Vec<usize>,
    reject_next_create: Option<String>,
}

/// In-memory host used by `tm chat` and the tests
///
/// Mode switches apply immediately. Created tasks and appended turns are
/// kept for inspection.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<MemoryState>,
}

impl MemoryHost {
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                mode,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every collaborator backed by this host
    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators::new(self.clone())
            .with_switcher(self.clone())
            .with_task_sink(self.clone())
            .with_transcript(self.clone())
            .with_query(self.clone())
    }

    /// Change the mode directly, as the user would from the host UI
    pub fn set_mode(&self, mode: OperatingMode) {
        debug!(%mode, "MemoryHost::set_mode: called");
        self.state().mode = mode;
    }

    /// Make the next create_tasks call fail with Rejected
    pub fn reject_next_create(&self, reason: impl Into<String>) {
        self.state().reject_next_create = Some(reason.into());
    }

    pub fn tasks(&self) -> Vec<EnrichedTaskDraft> {
        self.state().tasks.clone()
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.state().turns.clone()
    }

    pub fn switch_requests(&self) -> Vec<OperatingMode> {
        self.state().switch_requests.clone()
    }

    /// Batch size of each create_tasks call, in order
    pub fn create_calls(&self) -> Vec<usize> {
        self.state().create_calls.clone()
    }
}

impl ModeProvider for MemoryHost {
    fn current_mode(&self) -> OperatingMode {
        self.state().mode
    }
}

impl ModeSwitcher for MemoryHost {
    fn request_mode_switch(&self, mode: OperatingMode) -> Result<(), HostError> {
        info!(%mode, "MemoryHost: mode switch requested");
        let mut state = self.state();
        state.switch_requests.push(mode);
        state.mode = mode;
        Ok(())
    }
}

impl TaskSink for MemoryHost {
    fn create_tasks(&self, batch: Vec<EnrichedTaskDraft>) -> Result<(), HostError> {
        debug!(count = batch.len(), "MemoryHost::create_tasks: called");
        let mut state = self.state();
        if let Some(reason) = state.reject_next_create.take() {
            return Err(HostError::Rejected(reason));
        }
        state.create_calls.push(batch.len());
        state.tasks.extend(batch);
        Ok(())
    }
}

impl TranscriptSink for MemoryHost {
    fn append(&self, turn: &ConversationTurn) -> Result<(), HostError> {
        self.state().turns.push(turn.clone());
        Ok(())
    }
}

impl TaskQuery for MemoryHost {
    fn snapshot(&self) -> Result<Vec<TaskSnapshot>, HostError> {
        Ok(self
            .state()
            .tasks
            .iter()
            .map(|task| TaskSnapshot::new(&task.draft().assignee, task.draft().status))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ParseResult, PendingBatch, Schedule, SuggestedMode, TaskDraft, TaskStatus};

    fn batch(assignees: &[&str]) -> Vec<EnrichedTaskDraft> {
        let result = ParseResult {
            team_tasks: assignees
                .iter()
                .map(|a| TaskDraft {
                    title: "Ship it".to_string(),
                    description: "ship it".to_string(),
                    category: Category::Business,
                    assignee: a.to_string(),
                    status: TaskStatus::InProgress,
                })
                .collect(),
            suggested_mode: SuggestedMode::Team,
            ..Default::default()
        };
        PendingBatch::from_result(&result, &Schedule::default()).enrich("https://img")
    }

    #[test]
    fn test_mode_switch_applies_immediately() {
        let host = MemoryHost::new(OperatingMode::Team);
        host.request_mode_switch(OperatingMode::Solo).unwrap();

        assert_eq!(host.current_mode(), OperatingMode::Solo);
        assert_eq!(host.switch_requests(), vec![OperatingMode::Solo]);
    }

    #[test]
    fn test_create_tasks_and_snapshot() {
        let host = MemoryHost::new(OperatingMode::Team);
        host.create_tasks(batch(&["Tom", "Ana"])).unwrap();

        assert_eq!(host.create_calls(), vec![2]);
        let snapshot = host.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].assignee, "Tom");
        assert_eq!(snapshot[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_reject_next_create() {
        let host = MemoryHost::new(OperatingMode::Solo);
        host.reject_next_create("quota");

        let err = host.create_tasks(batch(&["Tom"])).unwrap_err();
        assert!(matches!(err, HostError::Rejected(ref r) if r == "quota"));
        assert!(host.tasks().is_empty());

        host.create_tasks(batch(&["Tom"])).unwrap();
        assert_eq!(host.create_calls(), vec![1]);
    }

    #[test]
    fn test_collaborators_are_complete() {
        let host = Arc::new(MemoryHost::new(OperatingMode::Solo));
        let collab = host.collaborators();

        assert!(collab.switcher.is_some());
        assert!(collab.tasks.is_some());
        assert!(collab.query.is_some());
        assert_eq!(collab.transcript.len(), 1);
        assert_eq!(collab.mode.current_mode(), OperatingMode::Solo);
    }
}
