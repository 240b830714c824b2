use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::time::truncate_to_minute;

/// Fixed length of every event the assistant creates or moves
pub const EVENT_DURATION_MINUTES: i64 = 60;

/// Calendar event as the assistant sees it, in the session timezone
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl CalendarEvent {
    /// Copy of this event occupying `window` instead
    pub fn rescheduled(&self, window: &ResolvedTimeWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
            ..self.clone()
        }
    }
}

/// Start and end of an event to create or move to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ResolvedTimeWindow {
    /// Window of the fixed event length, starting at `start` truncated to the minute
    pub fn starting_at(start: DateTime<Tz>) -> Self {
        let start = truncate_to_minute(start);
        Self {
            start,
            end: start + Duration::minutes(EVENT_DURATION_MINUTES),
        }
    }
}

/// Event resource as exchanged with the Google Calendar API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
}

/// Start or end of a Google event; all-day events only carry `date`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// Timed value in the given zone
    pub fn at(instant: &DateTime<Tz>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some(instant.timezone().name().to_string()),
        }
    }
}

/// Page of events returned by the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}
