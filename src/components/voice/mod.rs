//! Seam to the conversational layer: transcripts come in, text to speak goes out.

pub mod console;

use crate::error::AssistantResult;
use async_trait::async_trait;

pub use console::ConsoleVoice;

/// Speaks text back to the user
#[async_trait]
pub trait VoiceOutput: Send + Sync {
    async fn speak(&self, text: &str) -> AssistantResult<()>;
}

/// Callbacks delivered by the conversational layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// Final transcript of something the user said
    UserTranscript(String),
    /// Reply produced by the conversational agent
    AgentResponse(String),
    /// Agent reply cut short by the user
    InterruptedResponse { original: String, corrected: String },
}
