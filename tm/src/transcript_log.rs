//! JSONL transcript log
//!
//! When enabled via config (transcript.enabled = true), every turn the
//! dialogue appends is also written as one JSON line to
//! `{transcript.dir}/transcript-<timestamp>.jsonl`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ConversationTurn;
use crate::error::HostError;
use crate::host::TranscriptSink;

/// Entry in the transcript log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub entry_type: EntryType,
}

/// Type of transcript entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EntryType {
    UserMessage { content: String, attachments: usize },
    AssistantMessage { content: String },
    /// Assistant asked to confirm a batch
    ConfirmationPrompt { content: String, batch_id: Uuid, size: usize },
    SessionStart,
    SessionEnd,
}

impl From<&ConversationTurn> for EntryType {
    fn from(turn: &ConversationTurn) -> Self {
        if turn.is_from_user {
            return EntryType::UserMessage {
                content: turn.text.clone(),
                attachments: turn.attachments.len(),
            };
        }
        match &turn.attached_batch {
            Some(batch) if turn.is_confirmation_prompt => EntryType::ConfirmationPrompt {
                content: turn.text.clone(),
                batch_id: batch.id,
                size: batch.len(),
            },
            _ => EntryType::AssistantMessage {
                content: turn.text.clone(),
            },
        }
    }
}

/// Transcript sink that appends JSON lines to a file
pub struct TranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    log_path: PathBuf,
}

impl TranscriptLogger {
    /// Start a new log file under `dir`
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
        let log_path = dir.join(format!("transcript-{}.jsonl", timestamp));
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

        let logger = Self {
            writer: Mutex::new(BufWriter::new(file)),
            log_path,
        };
        debug!("Started transcript logging to: {}", logger.log_path.display());

        logger.write_entry(EntryType::SessionStart).map_err(std::io::Error::other)?;
        Ok(logger)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn write_entry(&self, entry_type: EntryType) -> Result<(), HostError> {
        let entry = TranscriptEntry {
            timestamp: Utc::now(),
            entry_type,
        };
        let json = serde_json::to_string(&entry)?;

        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(writer, "{}", json)?;
        // Flush after each entry so the file can be tailed
        writer.flush()?;
        Ok(())
    }
}

impl TranscriptSink for TranscriptLogger {
    fn append(&self, turn: &ConversationTurn) -> Result<(), HostError> {
        self.write_entry(EntryType::from(turn))
    }
}

impl Drop for TranscriptLogger {
    fn drop(&mut self) {
        if let Err(e) = self.write_entry(EntryType::SessionEnd) {
            warn!("Failed to close transcript log: {}", e);
        }
        debug!("Transcript log saved to: {}", self.log_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParseResult, PendingBatch, Schedule};

    fn read_entries(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_session_and_turns() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let logger = TranscriptLogger::open(dir.path()).unwrap();
            logger.append(&ConversationTurn::user("hi", Vec::new())).unwrap();
            logger.append(&ConversationTurn::assistant("hello")).unwrap();
            logger.log_path().to_path_buf()
        };

        let entries = read_entries(&path);
        let types: Vec<&str> = entries.iter().map(|e| e["entry_type"]["type"].as_str().unwrap()).collect();
        assert_eq!(
            types,
            vec!["SessionStart", "UserMessage", "AssistantMessage", "SessionEnd"]
        );
        assert_eq!(entries[1]["entry_type"]["data"]["content"], "hi");
    }

    #[test]
    fn test_confirmation_prompt_entry() {
        let batch = PendingBatch::from_result(&ParseResult::default(), &Schedule::default());
        let turn = ConversationTurn::confirmation("confirm?", batch.clone(), false);

        match EntryType::from(&turn) {
            EntryType::ConfirmationPrompt { batch_id, size, .. } => {
                assert_eq!(batch_id, batch.id);
                assert_eq!(size, 0);
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }
}
