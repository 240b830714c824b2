use crate::components::assistant::{AssistantHandle, AssistantSession};
use crate::components::google_calendar;
use crate::components::voice::{console::run_console, ConsoleVoice, VoiceOutput};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the calendar backend and the console voice layer together and run
/// until stdin closes or a termination signal arrives
pub async fn start_session(config: Arc<Config>) -> miette::Result<()> {
    crate::utils::i18n::set_locale(&config.locale);
    info!("Setting locale to {}", config.locale);

    let backend = google_calendar::connect(&config)?;
    let voice: Arc<dyn VoiceOutput> = Arc::new(ConsoleVoice);
    let session = AssistantSession::new(&config, backend, Arc::clone(&voice))?;

    info!(
        "Session for {} in timezone {}",
        session.user_name(),
        session.timezone()
    );

    // Schedule snapshot for the conversational agent
    let context = session.initial_context().await?;
    debug!("Agent prompt: {}", context.prompt);
    voice.speak(&context.first_message).await?;

    let assistant = AssistantHandle::new(session);

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_assistant = assistant.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_assistant).await;
    });

    // Wait for either the console to close or a shutdown signal
    tokio::select! {
        result = run_console(assistant.clone()) => {
            info!("Console session ended");
            if let Err(e) = assistant.shutdown().await {
                error!("Error shutting down assistant: {:?}", e);
            }
            result.map_err(Into::into)
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, ending session...");
            Ok(())
        }
    }
}
