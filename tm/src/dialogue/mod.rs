//! Conversational protocol around extracted drafts
//!
//! Idle -> AwaitingConfirmation -> (SwitchingMode ->) Committing -> Idle,
//! or back to Idle on cancel. [`DialogueMachine`] is the synchronous
//! reducer; [`DialogueRunner`] drives it from a tokio channel and owns the
//! settle timers.

mod events;
mod machine;
mod runner;

pub use events::{ChatEvent, DialogueState, SettleTimer};
pub use machine::DialogueMachine;
pub use runner::{DialogueHandle, DialogueRunner, channel};
