use super::models::{CalendarEvent, EventDateTime, GoogleEvent};
use crate::error::{google_calendar_error, AssistantResult};
use crate::utils::time::localize;
use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use tracing::warn;

/// Convert a Google start/end value into the session timezone.
/// All-day values map to midnight of that date.
pub fn event_instant(value: &EventDateTime, timezone: Tz) -> AssistantResult<DateTime<Tz>> {
    if let Some(date_time) = &value.date_time {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok(dt.with_timezone(&timezone))
    } else if let Some(date) = &value.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| google_calendar_error("Failed to create datetime"))?;
        localize(&timezone, midnight).ok_or_else(|| google_calendar_error("Invalid local time"))
    } else {
        Err(google_calendar_error("Event time has neither dateTime nor date"))
    }
}

/// Map an API event to the assistant's model. Events without an id or times are skipped.
pub fn to_calendar_event(event: GoogleEvent, timezone: Tz) -> AssistantResult<Option<CalendarEvent>> {
    let Some(id) = event.id else {
        warn!("Skipping calendar event without id");
        return Ok(None);
    };
    let (Some(start), Some(end)) = (&event.start, &event.end) else {
        warn!("Skipping calendar event {} without start or end", id);
        return Ok(None);
    };

    Ok(Some(CalendarEvent {
        start: event_instant(start, timezone)?,
        end: event_instant(end, timezone)?,
        summary: event.summary.unwrap_or_default(),
        id,
    }))
}

/// Listing window used for resolutions: from now until the end of today
pub fn today_window(now: DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let end_of_day = now
        .with_hour(23)
        .and_then(|dt| dt.with_minute(59))
        .and_then(|dt| dt.with_second(59))
        .unwrap_or(now);
    (now, end_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn test_timed_value_converted_to_session_zone() {
        let value = EventDateTime {
            date_time: Some("2026-10-16T16:00:00Z".to_string()),
            ..Default::default()
        };
        let instant = event_instant(&value, New_York).unwrap();
        assert_eq!(instant, New_York.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_all_day_value_is_local_midnight() {
        let value = EventDateTime {
            date: Some("2026-10-17".to_string()),
            ..Default::default()
        };
        let instant = event_instant(&value, New_York).unwrap();
        assert_eq!(instant, New_York.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_event_without_id_is_skipped() {
        let event = GoogleEvent {
            summary: Some("Ghost".to_string()),
            ..Default::default()
        };
        assert!(to_calendar_event(event, New_York).unwrap().is_none());
    }

    #[test]
    fn test_missing_summary_becomes_empty() {
        let event = GoogleEvent {
            id: Some("abc".to_string()),
            summary: None,
            start: Some(EventDateTime {
                date_time: Some("2026-10-16T12:00:00-04:00".to_string()),
                ..Default::default()
            }),
            end: Some(EventDateTime {
                date_time: Some("2026-10-16T13:00:00-04:00".to_string()),
                ..Default::default()
            }),
        };
        let event = to_calendar_event(event, New_York).unwrap().unwrap();
        assert_eq!(event.id, "abc");
        assert_eq!(event.summary, "");
    }

    #[test]
    fn test_today_window_ends_before_midnight() {
        let now = New_York.with_ymd_and_hms(2026, 10, 16, 9, 41, 27).unwrap();
        let (start, end) = today_window(now);
        assert_eq!(start, now);
        assert_eq!(end, New_York.with_ymd_and_hms(2026, 10, 16, 23, 59, 59).unwrap());
    }
}
