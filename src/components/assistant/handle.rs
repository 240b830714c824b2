use super::actor::{AssistantActor, AssistantActorHandle};
use super::session::{AssistantSession, Outcome};
use crate::components::voice::ConversationEvent;
use crate::error::AssistantResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the assistant actor
#[derive(Clone)]
pub struct AssistantHandle {
    actor_handle: AssistantActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl AssistantHandle {
    /// Create a new AssistantHandle and spawn the actor
    pub fn new(session: AssistantSession) -> Self {
        let (mut actor, handle) = AssistantActor::new(session);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Hand a final user transcript to the assistant
    pub async fn user_transcript(&self, text: &str) -> AssistantResult<Outcome> {
        self.actor_handle
            .converse(ConversationEvent::UserTranscript(text.to_string()))
            .await
    }

    pub async fn agent_response(&self, text: &str) -> AssistantResult<()> {
        self.actor_handle
            .converse(ConversationEvent::AgentResponse(text.to_string()))
            .await
            .map(|_| ())
    }

    pub async fn interrupted_response(&self, original: &str, corrected: &str) -> AssistantResult<()> {
        self.actor_handle
            .converse(ConversationEvent::InterruptedResponse {
                original: original.to_string(),
                corrected: corrected.to_string(),
            })
            .await
            .map(|_| ())
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AssistantResult<()> {
        self.actor_handle.shutdown().await
    }
}
