use crate::config::Config;
use crate::error::{token_error, AssistantResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Seconds of validity assumed when the token endpoint does not say
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Anything that can hand out a bearer token for the Calendar API
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> AssistantResult<String>;
}

/// Token as persisted in the token file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp after which the access token is no longer valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl StoredToken {
    fn is_valid_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expiry| expiry > now)
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Reads the OAuth token from disk and refreshes it when it has expired
#[derive(Debug, Clone)]
pub struct TokenManager {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    token_url: String,
    client: Client,
}

impl TokenManager {
    pub fn new(path: impl Into<PathBuf>, client_id: &str, client_secret: &str) -> Self {
        Self {
            path: path.into(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.token_file,
            &config.google_client_id,
            &config.google_client_secret,
        )
    }

    /// Point refreshes at another endpoint
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self
    }

    /// Get the stored token, refreshing it first if it has expired
    pub async fn get_token(&self) -> AssistantResult<StoredToken> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            token_error(&format!(
                "Failed to read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let token: StoredToken = serde_json::from_str(&content)
            .map_err(|e| token_error(&format!("Failed to parse token JSON: {}", e)))?;

        if token.is_valid_at(Utc::now().timestamp()) {
            return Ok(token);
        }

        debug!("Stored access token expired, refreshing");
        self.refresh_token(&token).await
    }

    /// Refresh an expired token and persist the result
    async fn refresh_token(&self, token: &StoredToken) -> AssistantResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| token_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| token_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(token_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| token_error(&format!("Failed to parse token response: {}", e)))?;

        let new_token = StoredToken {
            access_token: refreshed.access_token,
            refresh_token: Some(refresh_token.to_string()),
            expires_at: Some(
                Utc::now().timestamp() + refreshed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            ),
        };
        self.set_token(&new_token).await?;
        info!("Refreshed Google Calendar access token");

        Ok(new_token)
    }

    /// Write a token to the token file
    pub async fn set_token(&self, token: &StoredToken) -> AssistantResult<()> {
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl AccessTokenProvider for TokenManager {
    async fn access_token(&self) -> AssistantResult<String> {
        Ok(self.get_token().await?.access_token)
    }
}

/// Fixed bearer token, for tests and short-lived scripts
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> AssistantResult<String> {
        Ok(self.0.clone())
    }
}
