//! Keyword classification of transcripts and slot extraction.
//!
//! Rules are evaluated top to bottom and the first rule with a matching
//! trigger wins, so a transcript saying both "add event" and "delete event"
//! is a create. Each rule owns one extraction pattern; when the pattern
//! finds nothing the field is left empty and the caller decides what that
//! means.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Summary used when a create request names no event
pub const DEFAULT_SUMMARY: &str = "New Event";

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create { summary: String, raw_text: String },
    Move { name_fragment: Option<String>, raw_text: String },
    Delete { name_fragment: Option<String> },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Create,
    Move,
    Delete,
}

/// Capture group 1 of `pattern`, cleaned by `normalize`
pub struct ExtractionRule {
    pub pattern: Regex,
    pub normalize: fn(&str) -> Option<String>,
}

impl ExtractionRule {
    fn new(pattern: &str, normalize: fn(&str) -> Option<String>) -> Self {
        Self {
            // Patterns are compile-time literals
            pattern: Regex::new(pattern).unwrap(),
            normalize,
        }
    }

    pub fn extract(&self, transcript: &str) -> Option<String> {
        let caps = self.pattern.captures(transcript)?;
        (self.normalize)(caps.get(1)?.as_str())
    }
}

/// One row of the routing table
pub struct IntentRule {
    pub kind: IntentKind,
    /// Lowercase phrases, any of which selects this rule
    pub triggers: &'static [&'static str],
    pub extraction: ExtractionRule,
}

impl IntentRule {
    pub fn matches(&self, lowercase_transcript: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| lowercase_transcript.contains(trigger))
    }
}

fn as_spoken(span: &str) -> Option<String> {
    let span = span.trim();
    (!span.is_empty()).then(|| span.to_string())
}

fn trimmed_lowercase(span: &str) -> Option<String> {
    as_spoken(span).map(|span| span.to_lowercase())
}

lazy_static! {
    /// Routing table in priority order
    pub static ref RULES: Vec<IntentRule> = vec![
        IntentRule {
            kind: IntentKind::Create,
            triggers: &["add event", "schedule a"],
            // Event name sits between the trigger and the first "for"/"at"
            extraction: ExtractionRule::new(
                r"(?i)(?:add event|schedule an?|schedule)\s+(.*?)\s+(?:for|at)\b",
                as_spoken,
            ),
        },
        IntentRule {
            kind: IntentKind::Move,
            triggers: &["move event", "reschedule"],
            // Event name ends at the first " to", even one starting a word
            extraction: ExtractionRule::new(r"(?i)move event\s+(.*?)\s+to", as_spoken),
        },
        IntentRule {
            kind: IntentKind::Delete,
            triggers: &["delete event", "remove event"],
            extraction: ExtractionRule::new(r"(?i)(?:delete|remove) event\s+(.*)", trimmed_lowercase),
        },
    ];
}

/// Classify a transcript and pull out the fields its intent needs
pub fn classify(transcript: &str) -> Intent {
    let lowercase = transcript.to_lowercase();
    let Some(rule) = RULES.iter().find(|rule| rule.matches(&lowercase)) else {
        return Intent::None;
    };

    let field = rule.extraction.extract(transcript);
    debug!(kind = ?rule.kind, field = ?field, "Classified transcript");

    match rule.kind {
        IntentKind::Create => Intent::Create {
            summary: field.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            raw_text: transcript.to_string(),
        },
        IntentKind::Move => Intent::Move {
            name_fragment: field,
            raw_text: transcript.to_string(),
        },
        IntentKind::Delete => Intent::Delete {
            name_fragment: field,
        },
    }
}

impl Intent {
    pub fn kind(&self) -> Option<IntentKind> {
        match self {
            Intent::Create { .. } => Some(IntentKind::Create),
            Intent::Move { .. } => Some(IntentKind::Move),
            Intent::Delete { .. } => Some(IntentKind::Delete),
            Intent::None => None,
        }
    }
}
