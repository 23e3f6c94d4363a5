//! Itinerary text codec.
//!
//! Itineraries are stored in an item's `content` as plain text:
//!
//! ```text
//! 03/14/2024
//! \t10:00
//! \t\tMuseum || Louvre
//! \t\tDinner
//!
//! 03/15/2024
//! ```
//!
//! One block per day, separated by a blank line. The first line of a block
//! is the date. A line indented once is the time of the activity that
//! follows it; a line indented twice is an activity name, with an optional
//! ` || <location>` suffix.
//!
//! Inside a field, `\\`, `\n`, `\r`, `\t` and `\|` stand for a backslash,
//! newline, carriage return, tab and pipe, so field text can never be
//! mistaken for structure.

use std::cmp::Ordering;

use crate::model::{Activity, ItineraryDay};

const DAY_SEPARATOR: &str = "\n\n";
const LOCATION_SEPARATOR: &str = " || ";
const TIME_INDENT: &str = "\t";
const NAME_INDENT: &str = "\t\t";

/// Encodes days into the stored text form.
///
/// Activities are emitted in time order, untimed ones last; the sort is
/// stable so ties keep their original order.
pub fn encode(days: &[ItineraryDay]) -> String {
    days.iter()
        .map(encode_day)
        .collect::<Vec<_>>()
        .join(DAY_SEPARATOR)
}

fn encode_day(day: &ItineraryDay) -> String {
    let mut activities: Vec<&Activity> = day.activities.iter().collect();
    activities.sort_by(|a, b| by_time(a.time.as_deref(), b.time.as_deref()));

    let mut lines = vec![escape(&day.date)];
    for activity in activities {
        if let Some(time) = &activity.time {
            lines.push(format!("{TIME_INDENT}{}", escape(time)));
        }
        let mut line = format!("{NAME_INDENT}{}", escape(&activity.name));
        if let Some(location) = &activity.location {
            line.push_str(LOCATION_SEPARATOR);
            line.push_str(&escape(location));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Missing times sort after all present ones.
fn by_time(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Decodes stored text back into days.
///
/// Never fails: a time line with no activity after it is dropped, and
/// unindented lines after the date are read as untimed activities.
pub fn decode(text: &str) -> Vec<ItineraryDay> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(DAY_SEPARATOR).map(decode_day).collect()
}

fn decode_day(block: &str) -> ItineraryDay {
    let mut lines = block.lines();
    let date = unescape(lines.next().unwrap_or_default());

    let mut activities = Vec::new();
    let mut pending_time: Option<String> = None;
    for line in lines {
        if let Some(rest) = line.strip_prefix(NAME_INDENT) {
            activities.push(decode_activity(rest, pending_time.take()));
        } else if let Some(time) = line.strip_prefix(TIME_INDENT) {
            if let Some(dropped) = pending_time.replace(unescape(time)) {
                tracing::debug!(time = %dropped, "itinerary time with no activity");
            }
        } else if !line.is_empty() {
            activities.push(decode_activity(line, pending_time.take()));
        }
    }
    if let Some(dropped) = pending_time {
        tracing::debug!(time = %dropped, "itinerary time with no activity");
    }

    ItineraryDay { date, activities }
}

fn decode_activity(line: &str, time: Option<String>) -> Activity {
    let (name, location) = match line.split_once(LOCATION_SEPARATOR) {
        Some((name, location)) => (name, Some(unescape(location))),
        None => (line, None),
    };
    Activity {
        name: unescape(name),
        time,
        location,
    }
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '|' => out.push_str("\\|"),
            c => out.push(c),
        }
    }
    out
}

/// Unknown escapes and a trailing backslash are kept as written.
fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('\\' | '|')) => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}
