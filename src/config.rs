use crate::error::{config_error, env_error, AssistantResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default timezone for every instant the assistant produces
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Default name used when greeting the user
pub const DEFAULT_USER_NAME: &str = "Chandler";

/// Optional overrides file, relative to the working directory
pub const OVERRIDES_FILE: &str = "config/assistant.toml";

/// Main configuration structure for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID, used to refresh the access token
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Calendar to operate on
    pub google_calendar_id: String,
    /// Path of the stored OAuth token
    pub token_file: String,
    /// Timezone name for the whole session
    pub timezone: String,
    /// User identity for the greeting and the agent prompt
    pub user_name: String,
    /// Offset applied when a new event has no recognisable time
    pub lookahead_minutes: i64,
    /// Upper bound on events fetched per listing
    pub max_results: u32,
    /// Locale for spoken diagnostics
    pub locale: String,
}

/// Values that may be overridden from `config/assistant.toml`
#[derive(Debug, Default, Deserialize)]
pub struct ConfigOverrides {
    pub timezone: Option<String>,
    pub user_name: Option<String>,
    pub calendar_id: Option<String>,
    pub lookahead_minutes: Option<i64>,
    pub max_results: Option<u32>,
    pub locale: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_calendar_id: "primary".to_string(),
            token_file: "token.json".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
            lookahead_minutes: 60,
            max_results: 50,
            locale: "en".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and the overrides file
    pub fn load() -> AssistantResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;

        let defaults = Config::default();
        let mut config = Config {
            google_client_id,
            google_client_secret,
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .unwrap_or(defaults.google_calendar_id),
            token_file: env::var("GOOGLE_TOKEN_FILE").unwrap_or(defaults.token_file),
            timezone: env::var("TIMEZONE").unwrap_or(defaults.timezone),
            user_name: env::var("USER_NAME").unwrap_or(defaults.user_name),
            locale: env::var("ASSISTANT_LOCALE").unwrap_or(defaults.locale),
            ..defaults
        };

        if Path::new(OVERRIDES_FILE).exists() {
            let content = fs::read_to_string(OVERRIDES_FILE)?;
            config.apply_overrides(toml::from_str(&content)?);
        }

        // Fail early on a bad timezone name
        config.timezone()?;
        Ok(config)
    }

    /// Merge file overrides on top of the current values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if let Some(user_name) = overrides.user_name {
            self.user_name = user_name;
        }
        if let Some(calendar_id) = overrides.calendar_id {
            self.google_calendar_id = calendar_id;
        }
        if let Some(minutes) = overrides.lookahead_minutes {
            self.lookahead_minutes = minutes;
        }
        if let Some(max_results) = overrides.max_results {
            self.max_results = max_results;
        }
        if let Some(locale) = overrides.locale {
            self.locale = locale;
        }
    }

    /// Parse the configured timezone name
    pub fn timezone(&self) -> AssistantResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Offset used for new events without a recognisable time
    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lookahead_minutes)
    }
}
