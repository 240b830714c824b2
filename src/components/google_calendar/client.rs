use super::backend::CalendarBackend;
use super::models::{CalendarEvent, EventDateTime, EventList, GoogleEvent, ResolvedTimeWindow};
use super::time::to_calendar_event;
use super::token::AccessTokenProvider;
use crate::config::Config;
use crate::error::{google_calendar_error, AssistantResult};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Google Calendar v3 REST root
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar backend talking to the Google Calendar REST API
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: String,
    calendar_id: String,
    timezone: Tz,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: &str, timezone: Tz, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            client: Client::new(),
            tokens,
            base_url: GOOGLE_CALENDAR_API.to_string(),
            calendar_id: calendar_id.to_string(),
            timezone,
        }
    }

    pub fn from_config(
        config: &Config,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> AssistantResult<Self> {
        Ok(Self::new(&config.google_calendar_id, config.timezone()?, tokens))
    }

    /// Use another API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// URL of the events collection, or of one event when `event_id` is given
    fn events_url(&self, event_id: Option<&str>) -> AssistantResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?;
            segments
                .pop_if_empty()
                .push("calendars")
                .push(&self.calendar_id)
                .push("events");
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Authorize and send a request, turning non-2xx answers into errors
    async fn send(&self, request: RequestBuilder, action: &str) -> AssistantResult<Response> {
        let access_token = self.tokens.access_token().await?;

        let response = request
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        Ok(response)
    }

    async fn read_event(&self, response: Response, action: &str) -> AssistantResult<CalendarEvent> {
        let event: GoogleEvent = response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse {} response: {}", action, e))
        })?;
        to_calendar_event(event, self.timezone)?
            .ok_or_else(|| google_calendar_error(&format!("Incomplete event in {} response", action)))
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendarClient {
    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
        max_results: u32,
    ) -> AssistantResult<Vec<CalendarEvent>> {
        let mut url = self.events_url(None)?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339())
            .append_pair("timeMax", &time_max.to_rfc3339())
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = self.send(self.client.get(url), "fetch events").await?;
        let list: EventList = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        let mut events = Vec::with_capacity(list.items.len());
        for item in list.items {
            if let Some(event) = to_calendar_event(item, self.timezone)? {
                events.push(event);
            }
        }
        debug!("Fetched {} calendar events", events.len());

        Ok(events)
    }

    async fn create_event(
        &self,
        summary: &str,
        window: &ResolvedTimeWindow,
        timezone: Tz,
    ) -> AssistantResult<CalendarEvent> {
        let body = GoogleEvent {
            summary: Some(summary.to_string()),
            start: Some(EventDateTime::at(&window.start.with_timezone(&timezone))),
            end: Some(EventDateTime::at(&window.end.with_timezone(&timezone))),
            ..Default::default()
        };

        let url = self.events_url(None)?;
        let response = self
            .send(self.client.post(url).json(&body), "create event")
            .await?;
        let created = self.read_event(response, "create event").await?;
        info!("Created calendar event {}", created.id);

        Ok(created)
    }

    async fn get_event(&self, id: &str) -> AssistantResult<CalendarEvent> {
        let url = self.events_url(Some(id))?;
        let response = self.send(self.client.get(url), "fetch event").await?;
        self.read_event(response, "fetch event").await
    }

    async fn update_event(
        &self,
        id: &str,
        event: &CalendarEvent,
    ) -> AssistantResult<CalendarEvent> {
        let body = GoogleEvent {
            summary: Some(event.summary.clone()),
            start: Some(EventDateTime::at(&event.start)),
            end: Some(EventDateTime::at(&event.end)),
            ..Default::default()
        };

        let url = self.events_url(Some(id))?;
        let response = self
            .send(self.client.patch(url).json(&body), "update event")
            .await?;
        let updated = self.read_event(response, "update event").await?;
        info!("Updated calendar event {}", updated.id);

        Ok(updated)
    }

    async fn delete_event(&self, id: &str) -> AssistantResult<()> {
        let url = self.events_url(Some(id))?;
        self.send(self.client.delete(url), "delete event").await?;
        info!("Deleted calendar event {}", id);
        Ok(())
    }
}
