//! Taskmate - chat-driven task extraction
//!
//! Taskmate turns an informal chat message into structured task drafts,
//! sorts them into solo and team buckets, decides whether the user has to
//! confirm them, and runs the short propose / confirm / commit dialogue
//! that hands them to the host application.
//!
//! # Modules
//!
//! - [`domain`] - drafts, parse results, batches, transcript turns
//! - [`extract`] - matcher chain, drafter, classifier
//! - [`policy`] - confirmation rules and prompt selection
//! - [`dialogue`] - the conversation state machine and its async runner
//! - [`host`] - collaborator traits and an in-memory host
//! - [`prompts`] - reply templates
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod dialogue;
pub mod domain;
pub mod error;
pub mod extract;
pub mod host;
pub mod persona;
pub mod policy;
pub mod prompts;
pub mod repl;
pub mod transcript_log;
pub mod workload;

// Re-export commonly used types
pub use config::{ChatConfig, Config};
pub use dialogue::{ChatEvent, DialogueHandle, DialogueMachine, DialogueRunner, DialogueState, SettleTimer};
pub use domain::{
    Attachment, Category, ConversationTurn, EnrichedTaskDraft, OperatingMode, ParseResult, PendingBatch,
    SuggestedMode, TaskDraft, TaskSnapshot, TaskStatus,
};
pub use error::{ChatError, Collaborator, HostError};
pub use extract::TaskParser;
pub use host::{Collaborators, MemoryHost, ModeProvider, ModeSwitcher, TaskQuery, TaskSink, TranscriptSink};
pub use persona::Persona;
pub use policy::{Decision, PromptVariant};
