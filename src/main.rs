use tracing::info;
use voice_calendar::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting voice calendar assistant");

    // Load configuration
    let config = startup::load_config().await?;

    // Start the conversation
    startup::start_session(config).await
}
