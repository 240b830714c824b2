use super::context::SessionContext;
use super::intent::{classify, Intent, IntentKind};
use super::matcher::{find_event, MatchDirection};
use super::mutation::CalendarMutationService;
use super::resolver::DateTimeResolver;
use crate::components::google_calendar::time::today_window;
use crate::components::google_calendar::{CalendarBackend, CalendarEvent};
use crate::components::voice::VoiceOutput;
use crate::config::Config;
use crate::error::AssistantResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why a request stopped before touching the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Move request without a recognisable event name
    EventNameMissing,
    /// Delete request without a recognisable event name
    EventNameMissingForDelete,
    /// No event today matches the spoken name
    NoMatchingEvent(String),
    /// Move request without a recognisable new time
    DateTimeMissing,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match self {
            Diagnostic::EventNameMissing => t!("event_name_missing").to_string(),
            Diagnostic::EventNameMissingForDelete => t!("event_name_missing_delete").to_string(),
            Diagnostic::NoMatchingEvent(fragment) => {
                t!("no_matching_event", fragment = fragment).to_string()
            }
            Diagnostic::DateTimeMissing => t!("datetime_missing").to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Result of handling one transcript
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(CalendarEvent),
    Moved(CalendarEvent),
    Deleted(CalendarEvent),
    Aborted(Diagnostic),
    /// No calendar intent in the transcript
    Ignored,
}

impl Outcome {
    /// Text to speak back, if any
    pub fn message(&self) -> Option<String> {
        let message = match self {
            Outcome::Created(event) => t!(
                "event_created",
                summary = event.summary,
                start = event.start.to_rfc3339()
            )
            .to_string(),
            Outcome::Moved(event) => t!(
                "event_moved",
                summary = event.summary,
                start = event.start.to_rfc3339()
            )
            .to_string(),
            Outcome::Deleted(event) => t!("event_deleted", summary = event.summary).to_string(),
            Outcome::Aborted(diagnostic) => diagnostic.message(),
            Outcome::Ignored => return None,
        };
        Some(message)
    }
}

/// Everything one conversation needs, passed explicitly to each handler
pub struct AssistantSession {
    backend: Arc<dyn CalendarBackend>,
    mutations: CalendarMutationService,
    resolver: DateTimeResolver,
    voice: Arc<dyn VoiceOutput>,
    user_name: String,
    max_results: u32,
}

impl AssistantSession {
    pub fn new(
        config: &Config,
        backend: Arc<dyn CalendarBackend>,
        voice: Arc<dyn VoiceOutput>,
    ) -> AssistantResult<Self> {
        let timezone = config.timezone()?;
        Ok(Self {
            mutations: CalendarMutationService::new(Arc::clone(&backend), timezone),
            resolver: DateTimeResolver::new(timezone, config.lookahead()),
            backend,
            voice,
            user_name: config.user_name.clone(),
            max_results: config.max_results,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.resolver.timezone()
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Current time in the session timezone
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone())
    }

    pub async fn handle_transcript(&self, transcript: &str) -> AssistantResult<Outcome> {
        self.handle_transcript_at(transcript, self.now()).await
    }

    /// Classify, resolve and execute one transcript, then speak the result.
    ///
    /// Missing names, times or matches come back as `Outcome::Aborted`;
    /// only backend failures are errors. A failed reply is logged and the
    /// outcome still returned, since the calendar change already happened.
    pub async fn handle_transcript_at(
        &self,
        transcript: &str,
        now: DateTime<Tz>,
    ) -> AssistantResult<Outcome> {
        info!("User: {}", transcript);

        let outcome = match classify(transcript) {
            Intent::Create { summary, raw_text } => self.create(&summary, &raw_text, now).await?,
            Intent::Move {
                name_fragment,
                raw_text,
            } => {
                self.move_event(name_fragment.as_deref(), &raw_text, now)
                    .await?
            }
            Intent::Delete { name_fragment } => self.delete(name_fragment.as_deref(), now).await?,
            Intent::None => {
                debug!("No calendar request in transcript");
                Outcome::Ignored
            }
        };

        if let Outcome::Aborted(diagnostic) = &outcome {
            warn!("{}", diagnostic);
        }
        if let Some(message) = outcome.message() {
            if let Err(e) = self.voice.speak(&message).await {
                error!("Failed to speak response: {}", e);
            }
        }

        Ok(outcome)
    }

    async fn create(
        &self,
        summary: &str,
        raw_text: &str,
        now: DateTime<Tz>,
    ) -> AssistantResult<Outcome> {
        let window = self.resolver.window_or_default(raw_text, now);
        let created = self.mutations.create(summary, &window).await?;
        Ok(Outcome::Created(created))
    }

    async fn move_event(
        &self,
        fragment: Option<&str>,
        raw_text: &str,
        now: DateTime<Tz>,
    ) -> AssistantResult<Outcome> {
        let Some(fragment) = fragment else {
            return Ok(Outcome::Aborted(Diagnostic::EventNameMissing));
        };

        let events = self.todays_events(now).await?;
        let direction = MatchDirection::for_intent(IntentKind::Move);
        let Some(event) = find_event(Some(fragment), &events, direction) else {
            return Ok(Outcome::Aborted(Diagnostic::NoMatchingEvent(
                fragment.to_string(),
            )));
        };

        let Some(window) = self.resolver.window(raw_text, now) else {
            return Ok(Outcome::Aborted(Diagnostic::DateTimeMissing));
        };

        let moved = self.mutations.reschedule(&event.id, &window).await?;
        Ok(Outcome::Moved(moved))
    }

    async fn delete(&self, fragment: Option<&str>, now: DateTime<Tz>) -> AssistantResult<Outcome> {
        let Some(fragment) = fragment else {
            return Ok(Outcome::Aborted(Diagnostic::EventNameMissingForDelete));
        };

        let events = self.todays_events(now).await?;
        let direction = MatchDirection::for_intent(IntentKind::Delete);
        let Some(event) = find_event(Some(fragment), &events, direction) else {
            return Ok(Outcome::Aborted(Diagnostic::NoMatchingEvent(
                fragment.to_string(),
            )));
        };

        self.mutations.delete(event).await?;
        Ok(Outcome::Deleted(event.clone()))
    }

    /// Remaining events of today, fetched fresh on every call
    pub async fn todays_events(&self, now: DateTime<Tz>) -> AssistantResult<Vec<CalendarEvent>> {
        let (time_min, time_max) = today_window(now.with_timezone(&self.timezone()));
        self.backend
            .list_events(time_min, time_max, self.max_results)
            .await
    }

    /// One-off schedule snapshot handed to the conversational agent at start
    pub async fn initial_context_at(&self, now: DateTime<Tz>) -> AssistantResult<SessionContext> {
        let events = self.todays_events(now).await?;
        Ok(SessionContext::new(&self.user_name, &events))
    }

    pub async fn initial_context(&self) -> AssistantResult<SessionContext> {
        self.initial_context_at(self.now()).await
    }
}
