use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use std::io::{self, Cursor, Read};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use voice_calendar::components::assistant::{AssistantHandle, AssistantSession, Diagnostic, Outcome};
use voice_calendar::components::google_calendar::{CalendarBackend, CalendarEvent, ResolvedTimeWindow};
use voice_calendar::components::voice::console::{run_transcripts, spawn_line_reader};
use voice_calendar::components::voice::VoiceOutput;
use voice_calendar::config::Config;
use voice_calendar::error::{google_calendar_error, voice_error, AssistantResult, Error};

/// Backend call as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
        max_results: u32,
    },
    Create(String),
    Get(String),
    Update(String),
    Delete(String),
}

/// In-memory calendar that records every call it receives
#[derive(Default)]
pub struct MockCalendarBackend {
    events: Mutex<Vec<CalendarEvent>>,
    calls: Mutex<Vec<Call>>,
    failing: bool,
}

impl MockCalendarBackend {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    /// Backend whose every call fails like an unreachable API
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.events.lock().await.clone()
    }

    async fn record(&self, call: Call) -> AssistantResult<()> {
        self.calls.lock().await.push(call);
        if self.failing {
            return Err(google_calendar_error("503 Service Unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarBackend for MockCalendarBackend {
    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
        max_results: u32,
    ) -> AssistantResult<Vec<CalendarEvent>> {
        self.record(Call::List {
            time_min,
            time_max,
            max_results,
        })
        .await?;
        Ok(self.events().await)
    }

    async fn create_event(
        &self,
        summary: &str,
        window: &ResolvedTimeWindow,
        timezone: Tz,
    ) -> AssistantResult<CalendarEvent> {
        self.record(Call::Create(summary.to_string())).await?;
        let mut events = self.events.lock().await;
        let event = CalendarEvent {
            id: format!("created-{}", events.len() + 1),
            summary: summary.to_string(),
            start: window.start.with_timezone(&timezone),
            end: window.end.with_timezone(&timezone),
        };
        events.push(event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: &str) -> AssistantResult<CalendarEvent> {
        self.record(Call::Get(id.to_string())).await?;
        self.events
            .lock()
            .await
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or_else(|| google_calendar_error("404 Not Found"))
    }

    async fn update_event(&self, id: &str, event: &CalendarEvent) -> AssistantResult<CalendarEvent> {
        self.record(Call::Update(id.to_string())).await?;
        let mut events = self.events.lock().await;
        let stored = events
            .iter_mut()
            .find(|stored| stored.id == id)
            .ok_or_else(|| google_calendar_error("404 Not Found"))?;
        stored.summary = event.summary.clone();
        stored.start = event.start;
        stored.end = event.end;
        Ok(stored.clone())
    }

    async fn delete_event(&self, id: &str) -> AssistantResult<()> {
        self.record(Call::Delete(id.to_string())).await?;
        self.events.lock().await.retain(|event| event.id != id);
        Ok(())
    }
}

/// Voice layer that keeps everything it was asked to say
#[derive(Default)]
pub struct RecordingVoice {
    spoken: Mutex<Vec<String>>,
}

impl RecordingVoice {
    pub async fn spoken(&self) -> Vec<String> {
        self.spoken.lock().await.clone()
    }
}

#[async_trait]
impl VoiceOutput for RecordingVoice {
    async fn speak(&self, text: &str) -> AssistantResult<()> {
        self.spoken.lock().await.push(text.to_string());
        Ok(())
    }
}

/// Friday 2026-10-16 09:41:27 in New York
fn now() -> DateTime<Tz> {
    New_York.with_ymd_and_hms(2026, 10, 16, 9, 41, 27).unwrap()
}

fn at(hour: u32, minute: u32) -> DateTime<Tz> {
    New_York.with_ymd_and_hms(2026, 10, 16, hour, minute, 0).unwrap()
}

fn todays_events() -> Vec<CalendarEvent> {
    vec![
        CalendarEvent {
            id: "sync-1".to_string(),
            summary: "Team Sync".to_string(),
            start: at(10, 0),
            end: at(10, 30),
        },
        CalendarEvent {
            id: "lunch-1".to_string(),
            summary: "Lunch with Sam".to_string(),
            start: at(12, 0),
            end: at(13, 0),
        },
    ]
}

fn session(
    backend: Arc<MockCalendarBackend>,
    voice: Arc<RecordingVoice>,
) -> AssistantSession {
    let backend: Arc<dyn CalendarBackend> = backend;
    let voice: Arc<dyn VoiceOutput> = voice;
    AssistantSession::new(&Config::default(), backend, voice).unwrap()
}

fn setup(events: Vec<CalendarEvent>) -> (AssistantSession, Arc<MockCalendarBackend>, Arc<RecordingVoice>) {
    let backend = Arc::new(MockCalendarBackend::with_events(events));
    let voice = Arc::new(RecordingVoice::default());
    let session = session(Arc::clone(&backend), Arc::clone(&voice));
    (session, backend, voice)
}

#[tokio::test]
async fn test_create_event_at_spoken_time() {
    let (session, backend, voice) = setup(vec![]);

    let outcome = session
        .handle_transcript_at("add event Lunch at 1pm", now())
        .await
        .unwrap();

    let Outcome::Created(event) = outcome else {
        panic!("expected a created event, got {:?}", outcome);
    };
    assert_eq!(event.summary, "Lunch");
    assert_eq!(event.start, at(13, 0));
    assert_eq!(event.end, at(14, 0));

    assert_eq!(backend.calls().await, vec![Call::Create("Lunch".to_string())]);
    assert_eq!(
        voice.spoken().await,
        vec!["Event created: Lunch at 2026-10-16T13:00:00-04:00".to_string()]
    );
}

#[tokio::test]
async fn test_create_without_name_or_time_uses_defaults() {
    let (session, backend, _voice) = setup(vec![]);

    let outcome = session
        .handle_transcript_at("add event", now())
        .await
        .unwrap();

    let Outcome::Created(event) = outcome else {
        panic!("expected a created event, got {:?}", outcome);
    };
    // One hour ahead, seconds dropped
    assert_eq!(event.summary, "New Event");
    assert_eq!(event.start, at(10, 41));
    assert_eq!(event.end - event.start, Duration::hours(1));
    assert_eq!(backend.events().await.len(), 1);
}

#[tokio::test]
async fn test_create_with_explicit_offset_lands_in_session_zone() {
    let (session, _backend, _voice) = setup(vec![]);

    let outcome = session
        .handle_transcript_at("schedule a call for 3pm UTC", now())
        .await
        .unwrap();

    let Outcome::Created(event) = outcome else {
        panic!("expected a created event, got {:?}", outcome);
    };
    assert_eq!(event.summary, "call");
    assert_eq!(event.start.to_rfc3339(), "2026-10-16T11:00:00-04:00");
}

#[tokio::test]
async fn test_move_event_by_partial_name() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("move event lunch to 5pm", now())
        .await
        .unwrap();

    let Outcome::Moved(event) = outcome else {
        panic!("expected a moved event, got {:?}", outcome);
    };
    assert_eq!(event.id, "lunch-1");
    assert_eq!(event.summary, "Lunch with Sam");
    assert_eq!(event.start, at(17, 0));
    assert_eq!(event.end, at(18, 0));

    let calls = backend.calls().await;
    assert_eq!(
        calls,
        vec![
            Call::List {
                time_min: now(),
                time_max: New_York.with_ymd_and_hms(2026, 10, 16, 23, 59, 59).unwrap(),
                max_results: 50,
            },
            Call::Get("lunch-1".to_string()),
            Call::Update("lunch-1".to_string()),
        ]
    );
    assert_eq!(
        voice.spoken().await,
        vec!["Event 'Lunch with Sam' moved to 2026-10-16T17:00:00-04:00".to_string()]
    );
}

#[tokio::test]
async fn test_move_matches_summary_inside_longer_fragment() {
    let (session, _backend, _voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("move event the team sync meeting to 4pm", now())
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Moved(event) if event.id == "sync-1"));
}

#[tokio::test]
async fn test_move_without_time_changes_nothing() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("move event lunch to whenever works", now())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted(Diagnostic::DateTimeMissing));
    let calls = backend.calls().await;
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::List { .. }));
    assert_eq!(backend.events().await, todays_events());
    assert_eq!(
        voice.spoken().await,
        vec!["Could not detect new date/time for the event.".to_string()]
    );
}

#[tokio::test]
async fn test_reschedule_without_name_makes_no_calls() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("reschedule my dentist to 4pm", now())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted(Diagnostic::EventNameMissing));
    assert!(backend.calls().await.is_empty());
    assert_eq!(
        voice.spoken().await,
        vec!["Could not detect event name.".to_string()]
    );
}

#[tokio::test]
async fn test_delete_without_match_reports_fragment() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("delete event standup", now())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Aborted(Diagnostic::NoMatchingEvent("standup".to_string()))
    );
    let calls = backend.calls().await;
    assert!(!calls.iter().any(|call| matches!(call, Call::Delete(_))));
    assert_eq!(backend.events().await.len(), 2);
    assert_eq!(
        voice.spoken().await,
        vec!["No event found matching 'standup'".to_string()]
    );
}

#[tokio::test]
async fn test_delete_matching_event() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("Remove event Team Sync", now())
        .await
        .unwrap();

    assert!(matches!(&outcome, Outcome::Deleted(event) if event.id == "sync-1"));
    assert_eq!(backend.calls().await.last(), Some(&Call::Delete("sync-1".to_string())));

    let remaining = backend.events().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "lunch-1");
    assert_eq!(
        voice.spoken().await,
        vec!["Event 'Team Sync' deleted.".to_string()]
    );
}

#[tokio::test]
async fn test_delete_without_name() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("delete event", now())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted(Diagnostic::EventNameMissingForDelete));
    assert!(backend.calls().await.is_empty());
    assert_eq!(
        voice.spoken().await,
        vec!["Could not detect event name to delete.".to_string()]
    );
}

#[tokio::test]
async fn test_unrelated_transcript_is_ignored() {
    let (session, backend, voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("what's on my calendar today?", now())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Ignored);
    assert!(backend.calls().await.is_empty());
    assert!(voice.spoken().await.is_empty());
}

#[tokio::test]
async fn test_backend_failure_propagates() {
    let backend = Arc::new(MockCalendarBackend::failing());
    let voice = Arc::new(RecordingVoice::default());
    let session = session(Arc::clone(&backend), Arc::clone(&voice));

    let result = session
        .handle_transcript_at("add event Lunch at 1pm", now())
        .await;

    assert!(matches!(result, Err(Error::GoogleCalendar(_))));
    assert!(voice.spoken().await.is_empty());
}

#[tokio::test]
async fn test_initial_context_lists_remaining_events() {
    let (session, backend, _voice) = setup(todays_events());

    let context = session.initial_context_at(now()).await.unwrap();

    assert_eq!(
        context.schedule,
        "Team Sync at 2026-10-16T10:00:00-04:00; Lunch with Sam at 2026-10-16T12:00:00-04:00"
    );
    assert!(context.prompt.contains(&context.schedule));
    assert_eq!(context.first_message, "Hello Chandler, how can I help you today?");
    assert_eq!(backend.calls().await.len(), 1);
}

#[tokio::test]
async fn test_actor_keeps_running_after_errors() {
    let backend = Arc::new(MockCalendarBackend::failing());
    let voice = Arc::new(RecordingVoice::default());
    let assistant = AssistantHandle::new(session(Arc::clone(&backend), Arc::clone(&voice)));

    let failed = assistant.user_transcript("add event Lunch at 1pm").await;
    assert!(matches!(failed, Err(Error::GoogleCalendar(_))));

    // The next transcript is still handled
    let outcome = assistant.user_transcript("hello there").await.unwrap();
    assert_eq!(outcome, Outcome::Ignored);

    assistant.agent_response("Sure, done.").await.unwrap();
    assistant
        .interrupted_response("Your next meeting is", "Your next meeting")
        .await
        .unwrap();

    assistant.shutdown().await.unwrap();
    let closed = assistant.user_transcript("add event Lunch at 1pm").await;
    assert!(matches!(closed, Err(Error::Component(_))));
}

#[tokio::test]
async fn test_actor_handles_transcripts_in_order() {
    let backend = Arc::new(MockCalendarBackend::default());
    let voice = Arc::new(RecordingVoice::default());
    let assistant = AssistantHandle::new(session(Arc::clone(&backend), Arc::clone(&voice)));

    assistant.user_transcript("add event Gym at 6pm").await.unwrap();
    assistant.user_transcript("add event Dinner at 8pm").await.unwrap();

    assert_eq!(
        backend.calls().await,
        vec![
            Call::Create("Gym".to_string()),
            Call::Create("Dinner".to_string()),
        ]
    );
    assert_eq!(voice.spoken().await.len(), 2);
}

#[tokio::test]
async fn test_move_fragment_ends_at_first_to() {
    let (session, backend, _voice) = setup(todays_events());

    let outcome = session
        .handle_transcript_at("move event lunch today to 5pm", now())
        .await
        .unwrap();

    let Outcome::Moved(event) = outcome else {
        panic!("expected a moved event, got {:?}", outcome);
    };
    assert_eq!(event.id, "lunch-1");
    assert_eq!(event.start, at(17, 0));
    assert_eq!(backend.calls().await.last(), Some(&Call::Update("lunch-1".to_string())));
}

/// Voice layer whose output device is gone
struct FailingVoice;

#[async_trait]
impl VoiceOutput for FailingVoice {
    async fn speak(&self, _text: &str) -> AssistantResult<()> {
        Err(voice_error("Audio device unavailable"))
    }
}

#[tokio::test]
async fn test_failed_reply_still_reports_mutation() {
    let backend = Arc::new(MockCalendarBackend::default());
    let calendar: Arc<dyn CalendarBackend> = backend.clone();
    let voice: Arc<dyn VoiceOutput> = Arc::new(FailingVoice);
    let session = AssistantSession::new(&Config::default(), calendar, voice).unwrap();

    let outcome = session
        .handle_transcript_at("add event Lunch at 1pm", now())
        .await
        .unwrap();

    assert!(matches!(&outcome, Outcome::Created(event) if event.summary == "Lunch"));
    assert_eq!(backend.events().await.len(), 1);
}

#[tokio::test]
async fn test_actor_survives_out_of_range_offset() {
    let backend = Arc::new(MockCalendarBackend::default());
    let voice = Arc::new(RecordingVoice::default());
    let assistant = AssistantHandle::new(session(Arc::clone(&backend), Arc::clone(&voice)));

    // Falls back to the default start instead of overflowing
    let outcome = assistant
        .user_transcript("add event party in 99999999999999 days")
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Created(_)));

    let outcome = assistant.user_transcript("add event Dinner at 8pm").await.unwrap();
    assert!(matches!(&outcome, Outcome::Created(event) if event.summary == "Dinner"));

    assert_eq!(
        backend.calls().await,
        vec![
            Call::Create("New Event".to_string()),
            Call::Create("Dinner".to_string()),
        ]
    );
    assistant.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_console_lines_become_transcripts() {
    let backend = Arc::new(MockCalendarBackend::default());
    let voice = Arc::new(RecordingVoice::default());
    let assistant = AssistantHandle::new(session(Arc::clone(&backend), Arc::clone(&voice)));

    let input = Cursor::new("add event Gym at 6pm\n\n   \nadd event Dinner at 8pm\n");
    run_transcripts(assistant.clone(), spawn_line_reader(input))
        .await
        .unwrap();

    assert_eq!(
        backend.calls().await,
        vec![
            Call::Create("Gym".to_string()),
            Call::Create("Dinner".to_string()),
        ]
    );
    assistant.shutdown().await.unwrap();
}

/// Console input that never delivers a line, like an idle terminal
struct IdleInput;

impl Read for IdleInput {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        loop {
            thread::park();
        }
    }
}

#[test]
fn test_pending_console_read_does_not_block_runtime_shutdown() {
    let (done_send, done_recv) = std_mpsc::channel();

    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let backend = Arc::new(MockCalendarBackend::default());
            let voice = Arc::new(RecordingVoice::default());
            let assistant = AssistantHandle::new(session(backend, voice));
            let lines = spawn_line_reader(io::BufReader::new(IdleInput));

            tokio::select! {
                _ = run_transcripts(assistant.clone(), lines) => panic!("idle input produced a line"),
                _ = tokio::time::sleep(StdDuration::from_millis(50)) => {}
            }
            assistant.shutdown().await.unwrap();
        });
        // Dropping the runtime waits for its blocking tasks
        drop(runtime);
        done_send.send(()).unwrap();
    });

    assert!(done_recv.recv_timeout(StdDuration::from_secs(5)).is_ok());
}
