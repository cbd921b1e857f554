//! Domain types for TaskMate
//!
//! Core types shared by the extraction pipeline and the dialogue:
//! TaskDraft, ParseResult, PendingBatch, ConversationTurn.
//! None of these are persisted by the core; the host owns storage.

mod batch;
mod draft;
mod mode;
mod result;
mod turn;

pub use batch::{EnrichedTaskDraft, PendingBatch, Schedule, ScheduledDraft};
pub use draft::{CURRENT_USER, Category, TaskDraft, TaskSnapshot, TaskStatus};
pub use mode::{OperatingMode, SuggestedMode};
pub use result::ParseResult;
pub use turn::{Attachment, ConversationTurn};
