use super::VoiceOutput;
use crate::components::assistant::AssistantHandle;
use crate::error::{voice_error, AssistantResult, Error};
use async_trait::async_trait;
use std::io::{self, BufRead};
use std::thread;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Terminal stand-in for the voice layer: every stdin line is a transcript
/// and spoken text is printed.
#[derive(Debug, Clone, Default)]
pub struct ConsoleVoice;

#[async_trait]
impl VoiceOutput for ConsoleVoice {
    async fn speak(&self, text: &str) -> AssistantResult<()> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("Agent: {}\n", text).as_bytes())
            .await
            .map_err(|e| voice_error(&format!("Failed to speak: {}", e)))?;
        stdout
            .flush()
            .await
            .map_err(|e| voice_error(&format!("Failed to speak: {}", e)))
    }
}

/// Read lines from `reader` on a dedicated thread.
///
/// Blocking reads stay off the runtime, so a pending read never holds up
/// shutdown. The thread ends when input closes or the receiver is dropped.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read console input: {}", e);
                    break;
                }
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Feed lines to the assistant until the channel closes.
///
/// Lines are handed over one at a time and each is fully processed before
/// the next is taken.
pub async fn run_transcripts(
    assistant: AssistantHandle,
    mut lines: mpsc::Receiver<String>,
) -> AssistantResult<()> {
    while let Some(line) = lines.recv().await {
        let transcript = line.trim();
        if transcript.is_empty() {
            continue;
        }

        match assistant.user_transcript(transcript).await {
            Ok(outcome) => debug!(?outcome, "Transcript handled"),
            // Mailbox gone: nothing left to talk to
            Err(e @ Error::Component(_)) => return Err(e),
            // Already logged by the assistant
            Err(_) => {}
        }
    }

    info!("Console input closed");
    Ok(())
}

/// Feed stdin lines to the assistant until input closes
pub async fn run_console(assistant: AssistantHandle) -> AssistantResult<()> {
    let lines = spawn_line_reader(io::BufReader::new(io::stdin()));
    run_transcripts(assistant, lines).await
}
