use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    static ref OFFSET_RE: Regex = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"\d+").unwrap();
}

/// Longest run of words handed to the date parser at once
const MAX_SPAN_WORDS: usize = 8;

/// Largest number literal allowed inside a date expression
const MAX_NUMBER: u64 = 9999;

/// Time of day assumed for "tonight" when no clock time is given
const TONIGHT_HOUR: u32 = 20;

/// Spoken numbers that fuzzydate reads as a bare hour
const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "fourty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eigth",
    "ninth", "tenth", "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth",
    "sixteenth", "seventeenth", "eighteenth", "nineteenth", "twentieth", "thirtieth",
    "fourtieth", "fiftieth", "sixtieth", "seventieth", "eightieth", "ninetieth", "hundredth",
];

/// Date/time expression found in free text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDateTime {
    /// Wall-clock value without zone information
    Naive(NaiveDateTime),
    /// Instant that carried an explicit offset in the text
    Aware(DateTime<FixedOffset>),
}

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 || parts[1].len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Attach `zone` to a wall-clock value.
///
/// Ambiguous values (clocks turned back) take the earlier instant. Values
/// inside a gap (clocks turned forward) are pushed one hour later.
pub fn localize<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> Option<DateTime<Z>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => zone
            .from_local_datetime(&naive.checked_add_signed(Duration::hours(1))?)
            .earliest(),
    }
}

/// Drop seconds and sub-second precision
pub fn truncate_to_minute<Z: TimeZone>(instant: DateTime<Z>) -> DateTime<Z> {
    instant
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Find a date and/or time expression anywhere in `text`.
///
/// `now` is the current wall-clock time in the session timezone; relative
/// words ("tomorrow", "in 2 hours", "friday") are resolved against it.
/// The grammar itself is fuzzydate's: every run of words is offered to it
/// and the longest accepted run wins, the later one on ties. A date without
/// a time keeps the time of day of `now`, a time without a date means today.
/// Returns `None` when the text holds no recognisable expression at all.
pub fn extract_datetime(text: &str, now: NaiveDateTime) -> Option<ParsedDateTime> {
    let words = tokenize(text);

    // Full RFC 3339 stamps carry their own offset
    if let Some(stamp) = words
        .iter()
        .filter_map(|word| DateTime::parse_from_rfc3339(&word.raw).ok())
        .last()
    {
        return Some(ParsedDateTime::Aware(stamp));
    }

    // "in 2 hours" moves the reference point for everything else
    let (words, base) = match find_shift(&words) {
        Some((at, shift)) => {
            let base = now.checked_add_signed(shift)?;
            let rest = words
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !(at..at + 3).contains(i))
                .map(|(_, word)| word)
                .collect();
            (rest, Some(base))
        }
        None => (words, None),
    };

    let Some(span) = find_span(&words, base.unwrap_or(now)) else {
        return base.map(ParsedDateTime::Naive);
    };

    let mut value = span.value;
    let window = &words[span.start..span.end];
    if window.iter().any(|word| word.tonight) && !has_time_component(window) {
        value = value.date().and_time(NaiveTime::from_hms_opt(TONIGHT_HOUR, 0, 0)?);
    }

    match words.get(span.end).and_then(|word| zone_offset(&word.lower)) {
        Some(offset) => offset
            .from_local_datetime(&value)
            .single()
            .map(ParsedDateTime::Aware),
        None => Some(ParsedDateTime::Naive(value)),
    }
}

struct Word {
    raw: String,
    /// Lowercased and rewritten into fuzzydate's vocabulary
    lower: String,
    tonight: bool,
}

fn tokenize(text: &str) -> Vec<Word> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| matches!(c, ',' | ';' | '!' | '?' | '"' | '\'' | '(' | ')'))
                .trim_end_matches('.')
        })
        .filter(|word| !word.is_empty())
        .map(|raw| {
            let lower = raw.to_lowercase();
            Word {
                raw: raw.to_string(),
                tonight: lower == "tonight",
                lower: expand_word(&lower),
            }
        })
        .collect()
}

/// Spoken forms fuzzydate does not know
fn expand_word(word: &str) -> String {
    match word {
        "tonight" => "today".to_string(),
        "midday" => "noon".to_string(),
        _ => word.replace("a.m", "am").replace("p.m", "pm"),
    }
}

/// Position and size of the last "in N minutes/hours/days/weeks"
fn find_shift(words: &[Word]) -> Option<(usize, Duration)> {
    (0..words.len()).rev().find_map(|i| {
        if words[i].lower != "in" {
            return None;
        }
        let amount = amount_from(&words.get(i + 1)?.lower)?;
        let unit = words.get(i + 2)?.lower.as_str();
        let shift = match unit.strip_suffix('s').unwrap_or(unit) {
            "minute" | "min" => Duration::try_minutes(amount),
            "hour" | "hr" => Duration::try_hours(amount),
            "day" => Duration::try_days(amount),
            "week" => Duration::try_weeks(amount),
            _ => None,
        }?;
        Some((i, shift))
    })
}

struct Span {
    start: usize,
    end: usize,
    value: NaiveDateTime,
}

fn find_span(words: &[Word], now: NaiveDateTime) -> Option<Span> {
    let mut best: Option<Span> = None;

    for start in 0..words.len() {
        let longest = (start + MAX_SPAN_WORDS).min(words.len());
        for end in (start + 1..=longest).rev() {
            if !acceptable(words, start, end) {
                continue;
            }
            let Some(value) = parse_span(&words[start..end], now) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| end - start >= b.end - b.start) {
                best = Some(Span { start, end, value });
            }
            break;
        }
    }

    best
}

fn parse_span(window: &[Word], now: NaiveDateTime) -> Option<NaiveDateTime> {
    let input = window
        .iter()
        .map(|word| word.lower.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    // Parse in UTC so the host's local zone never shifts the wall clock
    let parsed = fuzzydate::aware_parse(input.as_str(), Some(Utc.from_utc_datetime(&now)), Utc);
    trace!(%input, ?parsed, "Date span candidate");
    parsed.ok().map(|dt| dt.naive_utc())
}

/// Filters runs fuzzydate would misread or could not compute safely
fn acceptable(words: &[Word], start: usize, end: usize) -> bool {
    let window = &words[start..end];

    let sane = window.iter().all(|word| {
        let numbers_fit = NUMBER_RE
            .find_iter(&word.lower)
            .all(|n| n.as_str().parse::<u64>().is_ok_and(|n| n <= MAX_NUMBER));
        let large_word = ["thousand", "million", "billion"]
            .iter()
            .any(|big| word.lower.starts_with(big));
        let clock_ok = !word.lower.contains(':')
            || parse_time(word.lower.trim_end_matches(|c: char| c.is_ascii_alphabetic())).is_some();
        numbers_fit && !large_word && clock_ok
    });
    if !sane {
        return false;
    }

    // A lone number is only an hour when spoken as "at N"
    if window.iter().all(|word| is_number(&word.lower)) {
        return start > 0 && words[start - 1].lower == "at";
    }
    true
}

fn is_number(word: &str) -> bool {
    (!word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())) || NUMBER_WORDS.contains(&word)
}

fn has_time_component(window: &[Word]) -> bool {
    window.iter().enumerate().any(|(i, word)| {
        let lower = word.lower.as_str();
        matches!(lower, "noon" | "midnight" | "am" | "pm")
            || lower.contains(':')
            || ((lower.ends_with("am") || lower.ends_with("pm"))
                && lower.starts_with(|c: char| c.is_ascii_digit()))
            || (lower == "at" && window.get(i + 1).is_some_and(|next| is_number(&next.lower)))
    })
}

fn zone_offset(word: &str) -> Option<FixedOffset> {
    if matches!(word, "utc" | "gmt" | "z") {
        return FixedOffset::east_opt(0);
    }
    let caps = OFFSET_RE.captures(word)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps[3].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    if &caps[1] == "-" {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }
}

fn amount_from(word: &str) -> Option<i64> {
    match word {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "ten" => Some(10),
        "fifteen" => Some(15),
        "thirty" => Some(30),
        _ => word.parse().ok().filter(|n| *n > 0),
    }
}
