//! DialogueMachine - the propose / confirm / commit reducer
//!
//! Synchronous: every event is handled to completion inside `handle`. The
//! only deferred work is the commit that follows a mode switch, which is
//! returned to the caller as a [`SettleTimer`] and resumed by feeding
//! `SettleElapsed` back in.

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::events::{ChatEvent, DialogueState, SettleTimer};
use crate::config::ChatConfig;
use crate::domain::{Attachment, ConversationTurn, OperatingMode, ParseResult, PendingBatch, Schedule};
use crate::error::{ChatError, Collaborator};
use crate::extract::TaskParser;
use crate::host::Collaborators;
use crate::persona::Persona;
use crate::policy;
use crate::prompts::{PromptLoader, ReplyContext};
use crate::workload;

/// A commit waiting out the settle delay after a mode switch
#[derive(Debug, Clone)]
struct DeferredCommit {
    batch: PendingBatch,
    target: OperatingMode,
}

/// Conversation state for one chat session
pub struct DialogueMachine {
    parser: TaskParser,
    prompts: PromptLoader,
    collab: Collaborators,
    schedule: Schedule,
    artwork_url: String,
    settle_delay: Duration,
    persona: Persona,
    state: DialogueState,
    pending: Option<PendingBatch>,
    deferred: Vec<DeferredCommit>,
    transcript: Vec<ConversationTurn>,
}

impl DialogueMachine {
    pub fn new(config: &ChatConfig, collab: Collaborators) -> Self {
        debug!(?collab, "DialogueMachine::new: called");
        Self {
            parser: TaskParser::from_config(config),
            prompts: PromptLoader::embedded_only(),
            collab,
            schedule: config.placeholder.to_schedule(),
            artwork_url: config.artwork_url.clone(),
            settle_delay: config.settle_delay(),
            persona: Persona::default(),
            state: DialogueState::Idle,
            pending: None,
            deferred: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptLoader) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_parser(mut self, parser: TaskParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn pending(&self) -> Option<&PendingBatch> {
        self.pending.as_ref()
    }

    /// Batches whose commit is waiting on a settle timer
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// The authoritative copy of every turn appended so far
    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Handle one event
    ///
    /// Returns a timer when a commit has been deferred behind a mode switch.
    /// Collaborator failures propagate; the core never retries.
    pub fn handle(&mut self, event: ChatEvent) -> Result<Option<SettleTimer>, ChatError> {
        debug!(event = event.name(), state = %self.state, "DialogueMachine::handle: called");
        match event {
            ChatEvent::MessageSubmitted { text, attachments } => {
                self.on_message(text, attachments)?;
                Ok(None)
            }
            ChatEvent::ConfirmPressed { switch_mode } => self.on_confirm(switch_mode),
            ChatEvent::CancelPressed => {
                self.on_cancel()?;
                Ok(None)
            }
            ChatEvent::PersonaSelected { persona } => {
                self.on_persona(persona)?;
                Ok(None)
            }
            ChatEvent::SettleElapsed { batch_id } => {
                self.on_settle(batch_id)?;
                Ok(None)
            }
        }
    }

    fn on_message(&mut self, text: String, attachments: Vec<Attachment>) -> Result<(), ChatError> {
        if text.trim().is_empty() && attachments.is_empty() {
            debug!("DialogueMachine::on_message: empty message ignored");
            return Ok(());
        }
        self.emit(ConversationTurn::user(text.clone(), attachments))?;

        if let Some(reply) = self.persona.canned_reply() {
            debug!(persona = %self.persona, "DialogueMachine::on_message: persona does not extract");
            return self.emit(ConversationTurn::assistant(reply));
        }

        let mode = self.collab.mode.current_mode();
        let result = self.parser.parse(&text, mode);

        if result.is_empty() {
            return if workload::mentions_workload(&text) {
                self.reply_workload(mode)
            } else {
                debug!("DialogueMachine::on_message: nothing extracted, sending help");
                let help = self.render("help", &ReplyContext::for_count(0, mode))?;
                self.emit(ConversationTurn::assistant(help))
            };
        }

        let decision = policy::decide(&result, mode);
        info!(summary = %decision.summary(&result, mode), "Policy decision");
        match decision.variant {
            Some(variant) => self.propose(&result, mode, variant, decision.signal_mismatch),
            None => self.auto_commit(&result, mode),
        }
    }

    /// Store a new pending batch and ask the user about it
    fn propose(
        &mut self,
        result: &ParseResult,
        mode: OperatingMode,
        variant: policy::PromptVariant,
        signal_mismatch: bool,
    ) -> Result<(), ChatError> {
        debug!(?variant, signal_mismatch, "DialogueMachine::propose: called");
        let target = match variant {
            policy::PromptVariant::TeamInSoloMode => OperatingMode::Team,
            policy::PromptVariant::SoloInTeamMode => OperatingMode::Solo,
            _ => result.suggested_mode.as_operating_mode().unwrap_or(mode),
        };
        let ctx = ReplyContext::for_tasks(&result.task_list(), mode)
            .with_target(target)
            .with_signals(result.is_team_task, result.is_solo_task);

        let mut text = self.render(variant.template_name(), &ctx)?;
        if signal_mismatch {
            text.push_str("\n\n");
            text.push_str(&self.render("signal-note", &ctx)?);
        }

        let batch = PendingBatch::from_result(result, &self.schedule);
        if let Some(old) = self.pending.replace(batch.clone()) {
            warn!(old_batch = %old.id, new_batch = %batch.id, "Replacing unconfirmed batch");
        }
        self.transition(DialogueState::AwaitingConfirmation);
        self.emit(ConversationTurn::confirmation(text, batch, variant.offers_switch()))
    }

    /// Create drafts that need no confirmation
    fn auto_commit(&mut self, result: &ParseResult, mode: OperatingMode) -> Result<(), ChatError> {
        debug!(total = result.total(), "DialogueMachine::auto_commit: called");
        let ctx = ReplyContext::for_tasks(&result.task_list(), mode);
        let Some(tasks) = self.collab.tasks.clone() else {
            debug!("DialogueMachine::auto_commit: no task sink, acknowledging only");
            let text = self.render("no-sink", &ctx)?;
            return self.emit(ConversationTurn::assistant(text));
        };

        let batch = PendingBatch::from_result(result, &self.schedule);
        tasks
            .create_tasks(batch.enrich(&self.artwork_url))
            .map_err(|e| ChatError::host(Collaborator::TaskSink, e))?;
        info!(batch_id = %batch.id, count = batch.len(), %mode, "Auto-created tasks");

        let text = self.render("auto-commit", &ctx)?;
        self.emit(ConversationTurn::assistant(text))
    }

    fn on_confirm(&mut self, switch_mode: bool) -> Result<Option<SettleTimer>, ChatError> {
        let Some(batch) = self.pending.take() else {
            warn!(state = %self.state, "Confirm pressed with no pending batch, ignoring");
            return Ok(None);
        };
        let mode = self.collab.mode.current_mode();
        debug!(batch_id = %batch.id, switch_mode, %mode, "DialogueMachine::on_confirm: called");

        if self.collab.tasks.is_none() {
            debug!("DialogueMachine::on_confirm: no task sink, acknowledging only");
            self.settle_state();
            let text = self.render("no-sink", &ReplyContext::for_tasks(&batch.task_list(), mode))?;
            return self.emit(ConversationTurn::assistant(text)).map(|_| None);
        }

        let target = batch.suggested_mode.as_operating_mode().filter(|t| *t != mode);
        match (switch_mode, target, self.collab.switcher.clone()) {
            (true, Some(target), Some(switcher)) => {
                self.transition(DialogueState::SwitchingMode);

                // Announce before switching: once the host has switched, the
                // timer must reach the caller
                let ctx = ReplyContext::for_count(batch.len(), mode).with_target(target);
                let announced = self
                    .render("switching", &ctx)
                    .and_then(|text| self.emit(ConversationTurn::assistant(text)));
                if let Err(e) = announced {
                    warn!(batch_id = %batch.id, "Switch announcement failed, batch stays pending");
                    self.pending = Some(batch);
                    self.settle_state();
                    return Err(e);
                }

                if let Err(e) = switcher.request_mode_switch(target) {
                    self.settle_state();
                    return Err(ChatError::host(Collaborator::ModeSwitcher, e));
                }
                info!(batch_id = %batch.id, %target, "Mode switch requested, commit deferred");

                let timer = SettleTimer {
                    batch_id: batch.id,
                    target,
                    delay: self.settle_delay,
                };
                self.deferred.push(DeferredCommit { batch, target });
                Ok(Some(timer))
            }
            (true, Some(_), None) => {
                warn!("Mode switch requested but no switcher supplied, committing in current mode");
                self.commit(batch, mode, "committed").map(|_| None)
            }
            _ => self.commit(batch, mode, "committed").map(|_| None),
        }
    }

    fn on_settle(&mut self, batch_id: Uuid) -> Result<(), ChatError> {
        let Some(index) = self.deferred.iter().position(|d| d.batch.id == batch_id) else {
            warn!(%batch_id, "Settle timer for unknown batch, ignoring");
            return Ok(());
        };
        let DeferredCommit { batch, target } = self.deferred.remove(index);
        debug!(%batch_id, %target, "DialogueMachine::on_settle: called");
        self.commit(batch, target, "committed-after-switch")
    }

    /// Enrich, emit to the task sink, and report
    fn commit(&mut self, batch: PendingBatch, mode: OperatingMode, template: &str) -> Result<(), ChatError> {
        self.transition(DialogueState::Committing);
        let sent = match self.collab.tasks.clone() {
            Some(tasks) => tasks.create_tasks(batch.enrich(&self.artwork_url)),
            None => {
                warn!(batch_id = %batch.id, "Task sink went away before commit, dropping batch");
                self.settle_state();
                return Ok(());
            }
        };
        self.settle_state();
        sent.map_err(|e| ChatError::host(Collaborator::TaskSink, e))?;
        info!(batch_id = %batch.id, count = batch.len(), %mode, "Committed batch");

        let ctx = ReplyContext::for_count(batch.len(), mode).with_target(mode);
        let text = self.render(template, &ctx)?;
        self.emit(ConversationTurn::assistant(text))
    }

    fn on_cancel(&mut self) -> Result<(), ChatError> {
        let Some(batch) = self.pending.take() else {
            warn!(state = %self.state, "Cancel pressed with no pending batch, ignoring");
            return Ok(());
        };
        info!(batch_id = %batch.id, "Batch cancelled");
        self.settle_state();
        let text = self.render(
            "cancelled",
            &ReplyContext::for_count(batch.len(), self.collab.mode.current_mode()),
        )?;
        self.emit(ConversationTurn::assistant(text))
    }

    fn on_persona(&mut self, persona: Persona) -> Result<(), ChatError> {
        debug!(%persona, "DialogueMachine::on_persona: called");
        self.persona = persona;
        let greeting = persona.greeting(self.collab.mode.current_mode());
        self.emit(ConversationTurn::assistant(greeting))
    }

    fn reply_workload(&mut self, mode: OperatingMode) -> Result<(), ChatError> {
        let snapshot = match (mode, &self.collab.query) {
            (OperatingMode::Team, Some(query)) => query
                .snapshot()
                .map_err(|e| ChatError::host(Collaborator::TaskQuery, e))?,
            _ => Vec::new(),
        };
        debug!(%mode, tasks = snapshot.len(), "DialogueMachine::reply_workload: called");

        let text = if snapshot.is_empty() {
            self.render("workload-hint", &ReplyContext::for_count(0, mode))?
        } else {
            let members = workload::analyze(&snapshot, &mut rand::rng());
            self.render("workload", &ReplyContext::for_workload(members))?
        };
        self.emit(ConversationTurn::assistant(text))
    }

    fn render(&self, template: &str, ctx: &ReplyContext) -> Result<String, ChatError> {
        self.prompts
            .render(template, ctx)
            .map_err(|e| ChatError::Template(e.to_string()))
    }

    /// Append to every transcript sink, then to our own transcript
    fn emit(&mut self, turn: ConversationTurn) -> Result<(), ChatError> {
        debug!(from_user = turn.is_from_user, "DialogueMachine::emit: called");
        for sink in &self.collab.transcript {
            sink.append(&turn)
                .map_err(|e| ChatError::host(Collaborator::TranscriptSink, e))?;
        }
        self.transcript.push(turn);
        Ok(())
    }

    /// Recompute the resting state from what is still outstanding
    fn settle_state(&mut self) {
        let next = if self.pending.is_some() {
            DialogueState::AwaitingConfirmation
        } else if !self.deferred.is_empty() {
            DialogueState::SwitchingMode
        } else {
            DialogueState::Idle
        };
        self.transition(next);
    }

    fn transition(&mut self, next: DialogueState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "DialogueMachine::transition");
            self.state = next;
        }
    }
}
