use super::session::{AssistantSession, Outcome};
use crate::components::voice::ConversationEvent;
use crate::error::{component_error, AssistantResult};
use tokio::sync::mpsc;
use tracing::{error, info};

/// The assistant actor that processes conversation callbacks one at a time
pub struct AssistantActor {
    session: AssistantSession,
    command_rx: mpsc::Receiver<AssistantCommand>,
}

/// Commands that can be sent to the assistant actor
pub enum AssistantCommand {
    Converse(ConversationEvent, mpsc::Sender<AssistantResult<Outcome>>),
    Shutdown,
}

/// Handle for communicating with the assistant actor
#[derive(Clone)]
pub struct AssistantActorHandle {
    command_tx: mpsc::Sender<AssistantCommand>,
}

impl AssistantActorHandle {
    /// Deliver a conversation event and wait until it has been handled
    pub async fn converse(&self, event: ConversationEvent) -> AssistantResult<Outcome> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(AssistantCommand::Converse(event, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AssistantResult<()> {
        let _ = self.command_tx.send(AssistantCommand::Shutdown).await;
        Ok(())
    }
}

impl AssistantActor {
    /// Create a new actor and return its handle
    pub fn new(session: AssistantSession) -> (Self, AssistantActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            session,
            command_rx,
        };

        let handle = AssistantActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Assistant actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AssistantCommand::Converse(event, response_tx) => {
                    let result = self.handle_event(event).await;
                    if let Err(e) = &result {
                        error!("Failed to handle transcript: {}", e);
                    }
                    let _ = response_tx.send(result).await;
                }
                AssistantCommand::Shutdown => {
                    info!("Assistant actor shutting down");
                    break;
                }
            }
        }

        info!("Assistant actor shut down");
    }

    async fn handle_event(&self, event: ConversationEvent) -> AssistantResult<Outcome> {
        match event {
            ConversationEvent::UserTranscript(text) => self.session.handle_transcript(&text).await,
            ConversationEvent::AgentResponse(text) => {
                info!("Agent: {}", text);
                Ok(Outcome::Ignored)
            }
            ConversationEvent::InterruptedResponse {
                original,
                corrected,
            } => {
                info!("Agent (interrupted): {} -> {}", original, corrected);
                Ok(Outcome::Ignored)
            }
        }
    }
}
