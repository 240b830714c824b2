use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the assistant
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(voice_calendar::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(voice_calendar::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(voice_calendar::google_calendar))]
    GoogleCalendar(String),

    #[error("OAuth token error: {0}")]
    #[diagnostic(
        code(voice_calendar::token),
        help("Make sure the token file holds a valid access or refresh token")
    )]
    Token(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(voice_calendar::component))]
    Component(String),

    #[error("Voice layer error: {0}")]
    #[diagnostic(code(voice_calendar::voice))]
    Voice(String),

    #[error(transparent)]
    #[diagnostic(code(voice_calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(voice_calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(voice_calendar::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AssistantResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create token errors
pub fn token_error(message: &str) -> Error {
    Error::Token(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create voice layer errors
pub fn voice_error(message: &str) -> Error {
    Error::Voice(message.to_string())
}
