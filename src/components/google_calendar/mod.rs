mod backend;
mod client;
pub mod models;
pub mod time;
pub mod token;

pub use backend::CalendarBackend;
pub use client::{GoogleCalendarClient, GOOGLE_CALENDAR_API};
pub use models::{CalendarEvent, ResolvedTimeWindow};
pub use token::{AccessTokenProvider, StaticToken, TokenManager};

use crate::config::Config;
use crate::error::AssistantResult;
use std::sync::Arc;

/// Build the Google Calendar backend described by `config`
pub fn connect(config: &Config) -> AssistantResult<Arc<dyn CalendarBackend>> {
    let tokens = Arc::new(TokenManager::from_config(config));
    let client = GoogleCalendarClient::from_config(config, tokens)?;
    Ok(Arc::new(client))
}
