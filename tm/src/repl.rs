//! Chat REPL session

use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::cli::{REPL_HELP, ReplInput};
use crate::dialogue::{ChatEvent, DialogueHandle};
use crate::domain::ConversationTurn;
use crate::error::HostError;
use crate::host::{MemoryHost, ModeProvider, TranscriptSink};
use crate::persona::Persona;

/// Prints assistant turns to stdout as they are appended
pub struct ConsoleTranscript;

impl TranscriptSink for ConsoleTranscript {
    fn append(&self, turn: &ConversationTurn) -> Result<(), HostError> {
        if turn.is_from_user {
            return Ok(());
        }
        println!("\n{}", turn.text);
        if let Some(hint) = confirmation_hint(turn) {
            println!("{}", hint.dimmed());
        }
        println!();
        Ok(())
    }
}

/// Command hint printed under a confirmation prompt
fn confirmation_hint(turn: &ConversationTurn) -> Option<&'static str> {
    match (turn.is_confirmation_prompt, turn.offers_switch) {
        (false, _) => None,
        (true, true) => Some("/yes to create, /switch to change mode first, /no to discard"),
        (true, false) => Some("/yes to create, /no to discard"),
    }
}

/// Interactive chat session against an in-memory host
pub struct ReplSession {
    handle: DialogueHandle,
    host: Arc<MemoryHost>,
}

impl ReplSession {
    pub fn new(handle: DialogueHandle, host: Arc<MemoryHost>) -> Self {
        Self { handle, host }
    }

    /// Run the REPL main loop
    ///
    /// Blocking: call from a blocking thread, not from an async task.
    pub fn run(self) -> Result<()> {
        self.print_welcome();
        self.handle.blocking_send(ChatEvent::PersonaSelected {
            persona: Persona::Plan,
        })?;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let prompt = format!("{} ", format!("[{}]>", self.host.current_mode()).bright_green());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.trim());
                    if !self.handle_input(ReplInput::parse(&line))? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("{}", "Goodbye!".dimmed());
        Ok(())
    }

    /// Returns false when the session should end
    fn handle_input(&self, input: ReplInput) -> Result<bool> {
        debug!(?input, "ReplSession::handle_input: called");
        match input {
            ReplInput::Empty => {}
            ReplInput::Message(text) => self.handle.blocking_send(ChatEvent::message(text))?,
            ReplInput::Confirm => self.handle.blocking_send(ChatEvent::ConfirmPressed { switch_mode: false })?,
            ReplInput::ConfirmWithSwitch => {
                self.handle.blocking_send(ChatEvent::ConfirmPressed { switch_mode: true })?
            }
            ReplInput::Cancel => self.handle.blocking_send(ChatEvent::CancelPressed)?,
            ReplInput::Persona(persona) => self.handle.blocking_send(ChatEvent::PersonaSelected { persona })?,
            ReplInput::Mode(mode) => {
                self.host.set_mode(mode);
                println!("{}", format!("Now in {} Mode.", mode.label()).dimmed());
            }
            ReplInput::Personas => print_personas(),
            ReplInput::Tasks => self.print_tasks(),
            ReplInput::Help => println!("{}", REPL_HELP.dimmed()),
            ReplInput::Quit => return Ok(false),
            ReplInput::Invalid(reason) => println!("{}", reason.red()),
        }
        Ok(true)
    }

    fn print_tasks(&self) {
        let tasks = self.host.tasks();
        if tasks.is_empty() {
            println!("{}", "No tasks created yet.".dimmed());
            return;
        }
        println!();
        println!("{}", "Created tasks:".bright_cyan());
        for (i, task) in tasks.iter().enumerate() {
            let draft = task.draft();
            println!(
                "  {} {}",
                draft.list_line(i + 1),
                format!("[{}, due {}]", draft.category, task.item.schedule.deadline).dimmed()
            );
        }
        println!();
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Taskmate".bright_cyan().bold());
        let mode = self.host.current_mode().label();
        println!(
            "{}",
            format!("Tell me what needs doing. {} Mode is active; /help for commands.", mode).dimmed()
        );
    }
}

fn print_personas() {
    println!();
    for persona in Persona::ALL {
        println!(
            "  {} {} {}",
            format!("{:<8}", persona.to_string()).bright_cyan(),
            persona.name(),
            format!("- {}", persona.description()).dimmed()
        );
    }
    println!();
}
