use super::intent::IntentKind;
use crate::components::google_calendar::CalendarEvent;

/// How a spoken fragment is compared with event summaries.
///
/// Move and delete compare differently and are kept apart on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDirection {
    /// Fragment inside the summary, or a non-empty summary inside the fragment
    Either,
    /// Fragment inside the trimmed summary
    FragmentInSummary,
}

impl MatchDirection {
    pub fn for_intent(kind: IntentKind) -> Self {
        match kind {
            IntentKind::Delete => MatchDirection::FragmentInSummary,
            IntentKind::Create | IntentKind::Move => MatchDirection::Either,
        }
    }

    fn accepts(self, fragment: &str, summary: &str) -> bool {
        match self {
            MatchDirection::Either => {
                let summary = summary.to_lowercase();
                summary.contains(fragment) || (!summary.is_empty() && fragment.contains(&summary))
            }
            MatchDirection::FragmentInSummary => {
                summary.trim().to_lowercase().contains(fragment)
            }
        }
    }
}

/// First event, in list order, whose summary matches `fragment` case-insensitively
pub fn find_event<'a>(
    fragment: Option<&str>,
    events: &'a [CalendarEvent],
    direction: MatchDirection,
) -> Option<&'a CalendarEvent> {
    let fragment = fragment?.trim().to_lowercase();
    if fragment.is_empty() {
        return None;
    }
    events
        .iter()
        .find(|event| direction.accepts(&fragment, &event.summary))
}
