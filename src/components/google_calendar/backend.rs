use super::models::{CalendarEvent, ResolvedTimeWindow};
use crate::error::AssistantResult;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;

/// Operations the assistant needs from a calendar.
///
/// Every failure (authorization, network, HTTP status) surfaces as an
/// `Error::GoogleCalendar`; implementations do not retry.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Events overlapping `[time_min, time_max]`, ordered by start time
    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
        max_results: u32,
    ) -> AssistantResult<Vec<CalendarEvent>>;

    /// Create a timed event and return it as stored by the calendar
    async fn create_event(
        &self,
        summary: &str,
        window: &ResolvedTimeWindow,
        timezone: Tz,
    ) -> AssistantResult<CalendarEvent>;

    async fn get_event(&self, id: &str) -> AssistantResult<CalendarEvent>;

    /// Submit the summary and times of `event` for the event `id`
    async fn update_event(&self, id: &str, event: &CalendarEvent)
        -> AssistantResult<CalendarEvent>;

    async fn delete_event(&self, id: &str) -> AssistantResult<()>;
}
