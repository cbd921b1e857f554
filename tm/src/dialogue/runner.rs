//! DialogueRunner - async event loop for a DialogueMachine

use eyre::{Result, eyre};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info};

use super::events::{ChatEvent, SettleTimer};
use super::machine::DialogueMachine;
use crate::domain::Attachment;
use crate::error::ChatError;
use crate::persona::Persona;

/// Create a runner and the handle that feeds it
pub fn channel(machine: DialogueMachine, buffer: usize) -> (DialogueHandle, DialogueRunner) {
    debug!(%buffer, "dialogue::channel: called");
    let (tx, rx) = mpsc::channel(buffer);
    (DialogueHandle { tx }, DialogueRunner::new(machine, rx))
}

/// Cloneable sender side of a running dialogue
#[derive(Clone)]
pub struct DialogueHandle {
    tx: mpsc::Sender<ChatEvent>,
}

impl DialogueHandle {
    pub async fn send(&self, event: ChatEvent) -> Result<()> {
        debug!(event = event.name(), "DialogueHandle::send: called");
        self.tx
            .send(event)
            .await
            .map_err(|_| eyre!("Dialogue channel closed"))
    }

    /// Send from a non-async thread, such as a blocking line editor
    pub fn blocking_send(&self, event: ChatEvent) -> Result<()> {
        self.tx
            .blocking_send(event)
            .map_err(|_| eyre!("Dialogue channel closed"))
    }

    pub async fn submit(&self, text: impl Into<String>, attachments: Vec<Attachment>) -> Result<()> {
        self.send(ChatEvent::MessageSubmitted {
            text: text.into(),
            attachments,
        })
        .await
    }

    pub async fn confirm(&self, switch_mode: bool) -> Result<()> {
        self.send(ChatEvent::ConfirmPressed { switch_mode }).await
    }

    pub async fn cancel(&self) -> Result<()> {
        self.send(ChatEvent::CancelPressed).await
    }

    pub async fn select_persona(&self, persona: Persona) -> Result<()> {
        self.send(ChatEvent::PersonaSelected { persona }).await
    }
}

/// Owns a DialogueMachine and applies events to it one at a time
///
/// Settle timers run on the same task as event handling, so the machine is
/// never touched concurrently.
pub struct DialogueRunner {
    machine: DialogueMachine,
    rx: mpsc::Receiver<ChatEvent>,
    timers: Vec<(Instant, SettleTimer)>,
    errors: Option<mpsc::UnboundedSender<ChatError>>,
}

impl DialogueRunner {
    pub fn new(machine: DialogueMachine, rx: mpsc::Receiver<ChatEvent>) -> Self {
        Self {
            machine,
            rx,
            timers: Vec::new(),
            errors: None,
        }
    }

    /// Forward collaborator failures to the host instead of only logging them
    pub fn with_error_channel(mut self, errors: mpsc::UnboundedSender<ChatError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Run until every handle is dropped, then finish outstanding commits
    ///
    /// Returns the machine so callers can inspect the final transcript.
    pub async fn run(mut self) -> DialogueMachine {
        info!("DialogueRunner started");

        loop {
            let next = self.next_deadline();
            let settle = async {
                match next {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        debug!("DialogueRunner::run: channel closed");
                        break;
                    }
                },
                _ = settle => self.fire_due(),
            }
        }

        // Deferred commits always run, even after the last handle is gone
        while let Some(deadline) = self.next_deadline() {
            sleep_until(deadline).await;
            self.fire_due();
        }

        info!("DialogueRunner stopped");
        self.machine
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|(deadline, _)| *deadline).min()
    }

    fn fire_due(&mut self) {
        let now = Instant::now();
        let (due, waiting): (Vec<_>, Vec<_>) = self.timers.drain(..).partition(|(deadline, _)| *deadline <= now);
        self.timers = waiting;
        for (_, timer) in due {
            debug!(batch_id = %timer.batch_id, "DialogueRunner::fire_due: settle elapsed");
            self.dispatch(timer.elapsed_event());
        }
    }

    fn dispatch(&mut self, event: ChatEvent) {
        match self.machine.handle(event) {
            Ok(Some(timer)) => {
                debug!(batch_id = %timer.batch_id, delay = ?timer.delay, "DialogueRunner::dispatch: timer scheduled");
                self.timers.push((Instant::now() + timer.delay, timer));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Dialogue event failed: {}", e);
                if let Some(errors) = &self.errors {
                    let _ = errors.send(e);
                }
            }
        }
    }
}
