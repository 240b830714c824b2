use crate::components::google_calendar::{CalendarBackend, CalendarEvent, ResolvedTimeWindow};
use crate::error::AssistantResult;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

/// The only code path that changes calendar state.
///
/// Each method performs its backend calls once; there are no retries and
/// no idempotency keys, so a repeated create makes a second event.
#[derive(Clone)]
pub struct CalendarMutationService {
    backend: Arc<dyn CalendarBackend>,
    timezone: Tz,
}

impl CalendarMutationService {
    pub fn new(backend: Arc<dyn CalendarBackend>, timezone: Tz) -> Self {
        Self { backend, timezone }
    }

    pub async fn create(
        &self,
        summary: &str,
        window: &ResolvedTimeWindow,
    ) -> AssistantResult<CalendarEvent> {
        let created = self
            .backend
            .create_event(summary, window, self.timezone)
            .await?;
        info!("Event created: {} at {}", created.summary, created.start.to_rfc3339());
        Ok(created)
    }

    /// Fetch the current event, move it to `window` and submit the update
    pub async fn reschedule(
        &self,
        event_id: &str,
        window: &ResolvedTimeWindow,
    ) -> AssistantResult<CalendarEvent> {
        let current = self.backend.get_event(event_id).await?;
        let updated = self
            .backend
            .update_event(event_id, &current.rescheduled(window))
            .await?;
        info!("Event '{}' moved to {}", updated.summary, updated.start.to_rfc3339());
        Ok(updated)
    }

    pub async fn delete(&self, event: &CalendarEvent) -> AssistantResult<()> {
        self.backend.delete_event(&event.id).await?;
        info!("Event '{}' deleted", event.summary);
        Ok(())
    }
}
