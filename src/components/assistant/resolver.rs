use crate::components::google_calendar::ResolvedTimeWindow;
use crate::utils::time::{extract_datetime, localize, truncate_to_minute, ParsedDateTime};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::debug;

/// Turns spoken date/time expressions into instants in the session timezone
#[derive(Debug, Clone, Copy)]
pub struct DateTimeResolver {
    timezone: Tz,
    lookahead: Duration,
}

impl DateTimeResolver {
    pub fn new(timezone: Tz, lookahead: Duration) -> Self {
        Self {
            timezone,
            lookahead,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Instant named in `raw_text`, truncated to the minute.
    ///
    /// Zone-less expressions are read as wall-clock time in the session
    /// timezone; expressions with an explicit offset are converted into it.
    pub fn resolve(&self, raw_text: &str, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
        let local_now = now.with_timezone(&self.timezone).naive_local();
        let instant = match extract_datetime(raw_text, local_now)? {
            ParsedDateTime::Naive(naive) => localize(&self.timezone, naive)?,
            ParsedDateTime::Aware(aware) => aware.with_timezone(&self.timezone),
        };
        debug!(%instant, "Resolved date/time from transcript");
        Some(truncate_to_minute(instant))
    }

    /// Like [`resolve`](Self::resolve), falling back to `now` plus the lookahead
    pub fn resolve_or_default(&self, raw_text: &str, now: DateTime<Tz>) -> DateTime<Tz> {
        self.resolve(raw_text, now)
            .unwrap_or_else(|| self.default_start(now))
    }

    pub fn default_start(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        let now = now.with_timezone(&self.timezone);
        truncate_to_minute(now.checked_add_signed(self.lookahead).unwrap_or(now))
    }

    /// Window for a create: never fails
    pub fn window_or_default(&self, raw_text: &str, now: DateTime<Tz>) -> ResolvedTimeWindow {
        ResolvedTimeWindow::starting_at(self.resolve_or_default(raw_text, now))
    }

    /// Window for a move: `None` when no time was spoken
    pub fn window(&self, raw_text: &str, now: DateTime<Tz>) -> Option<ResolvedTimeWindow> {
        self.resolve(raw_text, now)
            .map(ResolvedTimeWindow::starting_at)
    }
}
