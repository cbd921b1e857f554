//! Integration tests for the dialogue runner
//!
//! These drive a DialogueMachine through its tokio channel against an
//! in-memory host, with real (short) settle delays.

use std::sync::Arc;
use std::time::Duration;

use taskmate::config::ChatConfig;
use taskmate::dialogue::{self, DialogueHandle, DialogueMachine, DialogueRunner, DialogueState};
use taskmate::domain::OperatingMode;
use taskmate::error::Collaborator;
use taskmate::host::{MemoryHost, ModeProvider};
use taskmate::transcript_log::TranscriptLogger;
use tempfile::TempDir;
use tokio::sync::mpsc;

const MIXED: &str = "I have completed the database migration and Alice Chen is working on the UI redesign";
const SOLO_REPORT: &str = "I am working on the quarterly report";

fn setup(mode: OperatingMode, settle_delay_ms: u64) -> (Arc<MemoryHost>, DialogueHandle, DialogueRunner) {
    let host = Arc::new(MemoryHost::new(mode));
    let config = ChatConfig {
        settle_delay_ms,
        ..Default::default()
    };
    let machine = DialogueMachine::new(&config, host.collaborators());
    let (handle, runner) = dialogue::channel(machine, 16);
    (host, handle, runner)
}

/// Poll until `cond` holds or the timeout passes
async fn wait_for(what: &str, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {}", what);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

async fn finish(handle: DialogueHandle, runner: tokio::task::JoinHandle<DialogueMachine>) -> DialogueMachine {
    drop(handle);
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("runner should stop once the handle is dropped")
        .expect("runner task panicked")
}

// =============================================================================
// Confirmation round trips
// =============================================================================

#[tokio::test]
async fn test_confirm_without_switch_creates_once() {
    let (host, handle, runner) = setup(OperatingMode::Solo, 50);
    let runner = tokio::spawn(runner.run());

    handle.submit(MIXED, Vec::new()).await.unwrap();
    wait_for("confirmation prompt", || host.turns().len() == 2).await;
    assert!(host.turns()[1].is_confirmation_prompt);

    handle.confirm(false).await.unwrap();
    let machine = finish(handle, runner).await;

    assert_eq!(host.create_calls(), vec![2]);
    assert!(host.switch_requests().is_empty());
    assert_eq!(host.turns().len(), 3);
    assert!(host.turns()[2].text.contains("created 2 tasks"));
    assert_eq!(machine.state(), DialogueState::Idle);
    assert_eq!(machine.transcript().len(), 3);
}

#[tokio::test]
async fn test_confirm_with_switch_commits_after_settle_delay() {
    let (host, handle, runner) = setup(OperatingMode::Team, 300);
    let runner = tokio::spawn(runner.run());

    handle.submit(SOLO_REPORT, Vec::new()).await.unwrap();
    wait_for("confirmation prompt", || host.turns().len() == 2).await;

    handle.confirm(true).await.unwrap();
    wait_for("switching turn", || host.turns().len() == 3).await;

    // Switch is requested and announced before anything is created
    assert_eq!(host.switch_requests(), vec![OperatingMode::Solo]);
    assert_eq!(host.current_mode(), OperatingMode::Solo);
    assert_eq!(host.turns()[2].text, "🔄 Switching to Solo Mode...");
    assert!(host.create_calls().is_empty());

    wait_for("deferred commit", || !host.create_calls().is_empty()).await;
    let machine = finish(handle, runner).await;

    assert_eq!(host.create_calls(), vec![1]);
    assert_eq!(host.switch_requests().len(), 1);
    let turns = host.turns();
    assert_eq!(turns.len(), 4);
    assert_eq!(
        turns[3].text,
        "✅ Created 1 task in Solo Mode! Check your dashboard to see them."
    );
    assert_eq!(machine.state(), DialogueState::Idle);
}

#[tokio::test]
async fn test_deferred_commit_survives_dropped_handle() {
    let (host, handle, runner) = setup(OperatingMode::Team, 50);
    let runner = tokio::spawn(runner.run());

    handle.submit(SOLO_REPORT, Vec::new()).await.unwrap();
    handle.confirm(true).await.unwrap();
    finish(handle, runner).await;

    assert_eq!(host.switch_requests(), vec![OperatingMode::Solo]);
    assert_eq!(host.create_calls(), vec![1]);
}

#[tokio::test]
async fn test_cancel_appends_one_turn_and_creates_nothing() {
    let (host, handle, runner) = setup(OperatingMode::Solo, 50);
    let runner = tokio::spawn(runner.run());

    handle.submit(MIXED, Vec::new()).await.unwrap();
    handle.cancel().await.unwrap();
    let machine = finish(handle, runner).await;

    let turns = host.turns();
    assert_eq!(turns.len(), 3);
    assert!(turns[2].text.starts_with("No problem!"));
    assert!(host.create_calls().is_empty());
    assert!(machine.pending().is_none());
}

// =============================================================================
// Concurrency around the deferred commit
// =============================================================================

#[tokio::test]
async fn test_message_during_switch_is_independent() {
    let (host, handle, runner) = setup(OperatingMode::Team, 300);
    let runner = tokio::spawn(runner.run());

    handle.submit(SOLO_REPORT, Vec::new()).await.unwrap();
    handle.confirm(true).await.unwrap();
    wait_for("switching turn", || host.turns().len() == 3).await;

    // Host is now in solo mode, so a single personal task commits at once
    handle.submit("I need to water the plants", Vec::new()).await.unwrap();
    wait_for("auto commit", || host.create_calls().len() == 1).await;

    let machine = finish(handle, runner).await;

    assert_eq!(host.create_calls(), vec![1, 1]);
    let titles: Vec<String> = host.tasks().iter().map(|t| t.draft().title.clone()).collect();
    assert_eq!(titles, vec!["Water the plants", "The quarterly report"]);
    assert!(host.turns().last().unwrap().text.starts_with("✅ Created 1 task in Solo Mode!"));
    assert_eq!(machine.deferred_count(), 0);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_sink_failure_reaches_error_channel() {
    let (host, handle, runner) = setup(OperatingMode::Solo, 50);
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    let runner = tokio::spawn(runner.with_error_channel(err_tx).run());

    host.reject_next_create("board is read-only");
    handle.submit(MIXED, Vec::new()).await.unwrap();
    handle.confirm(false).await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), err_rx.recv())
        .await
        .expect("error should be forwarded")
        .expect("error channel closed");
    assert_eq!(err.collaborator(), Some(Collaborator::TaskSink));
    assert!(err.to_string().contains("board is read-only"));

    let machine = finish(handle, runner).await;
    assert_eq!(machine.state(), DialogueState::Idle);
    assert!(host.tasks().is_empty());
}

// =============================================================================
// Transcript log
// =============================================================================

#[tokio::test]
async fn test_transcript_log_records_confirmation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let host = Arc::new(MemoryHost::new(OperatingMode::Solo));
    let logger = Arc::new(TranscriptLogger::open(temp_dir.path()).unwrap());
    let log_path = logger.log_path().to_path_buf();

    let collab = host.collaborators().with_transcript(logger);
    let machine = DialogueMachine::new(&ChatConfig::default(), collab);
    let (handle, runner) = dialogue::channel(machine, 16);
    let runner = tokio::spawn(runner.run());

    handle.submit(MIXED, Vec::new()).await.unwrap();
    handle.confirm(false).await.unwrap();
    finish(handle, runner).await;

    let content = std::fs::read_to_string(&log_path).unwrap();
    let types: Vec<String> = content
        .lines()
        .map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            entry["entry_type"]["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        types,
        vec![
            "SessionStart",
            "UserMessage",
            "ConfirmationPrompt",
            "AssistantMessage",
            "SessionEnd"
        ]
    );
}
