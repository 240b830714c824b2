use crate::components::google_calendar::CalendarEvent;

/// Schedule text used when nothing is left on today's calendar
pub const NO_EVENTS_TODAY: &str = "You have no events scheduled today.";

/// Opening context for the conversational agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub schedule: String,
    pub prompt: String,
    pub first_message: String,
}

impl SessionContext {
    pub fn new(user_name: &str, events: &[CalendarEvent]) -> Self {
        let schedule = schedule_summary(events);
        Self {
            prompt: agent_prompt(&schedule),
            first_message: first_message(user_name),
            schedule,
        }
    }
}

/// "Team Sync at 2026-10-16T10:00:00-04:00; Lunch at ..."
pub fn schedule_summary(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS_TODAY.to_string();
    }
    events
        .iter()
        .map(|event| format!("{} at {}", event.summary, event.start.to_rfc3339()))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn agent_prompt(schedule: &str) -> String {
    format!(
        "You are a helpful assistant. Your interlocutor has the following schedule: {}. \
         You can also add, move, and delete events in their Google Calendar when asked.",
        schedule
    )
}

pub fn first_message(user_name: &str) -> String {
    t!("greeting", name = user_name).to_string()
}
