// src/codec.rs
//! Day-line codec.
//!
//! A day-group is stored remotely (and exported to the clipboard) as a single
//! line of text:
//!
//! ```text
//! 2026-02-04,"[膝蓋輕鬆]｜深蹲: 0kg 10下 x3組｜側抬腿【左】: 15下 x2組 (慢)"
//! ```
//!
//! The content part is a list of segments joined by [`SEGMENT_SEPARATOR`]. An
//! optional leading `[...]` segment carries the day's status note; every other
//! segment is one log entry.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::model::{DayGroup, LogEntry, Side};

/// Full-width bar; does not occur in normally entered Chinese text.
pub const SEGMENT_SEPARATOR: &str = "｜";
pub const SETS_UNIT: &str = "組";
pub const MINUTES_UNIT: &str = "分鐘";
/// Unit of entries that only mark completion (sets <= 0).
pub const COMPLETION_UNIT: &str = "次";
/// Category given to decoded entries whose exercise is not in the catalog.
pub const UNRESOLVED_CATEGORY: &str = "未分類";

static SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>.+?)(?:【(?P<side>[^】]*)】)?: (?P<value>.*?)(?: x(?P<sets>\d+)組| (?P<minutes>\d+)分鐘)?(?: \((?P<notes>.*)\))?$",
    )
    .expect("segment pattern is valid")
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date pattern is valid"));

/// A `{date, content}` row as exchanged with the remote history sheet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub date: String,
    pub content: String,
}

impl HistoryRow {
    #[must_use]
    pub fn new(date: NaiveDate, content: String) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            content,
        }
    }

    /// The first `YYYY-MM-DD` found in the date cell. Sheet cells may carry
    /// extra formatting around the date.
    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        DATE_RE
            .find(&self.date)
            .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
    }
}

/// Result of decoding one day's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDay {
    pub date: NaiveDate,
    pub status: String,
    pub entries: Vec<LogEntry>,
    /// Segments that did not match the entry grammar, in input order.
    pub dropped: Vec<String>,
}

impl DecodedDay {
    #[must_use]
    pub fn into_group(self) -> DayGroup {
        DayGroup {
            date: self.date,
            status: self.status,
            entries: self.entries,
        }
    }
}

/// Encodes one entry as `<name>[【side】]: <value>[ x<sets>組 | <sets>分鐘][ (<notes>)]`.
#[must_use]
pub fn encode_segment(entry: &LogEntry) -> String {
    let mut segment = entry.exercise_name.clone();
    if entry.side != Side::NotApplicable {
        segment.push_str(&format!("【{}】", entry.side));
    }
    segment.push_str(": ");
    segment.push_str(&entry.value);

    if entry.sets > 0 {
        if entry.unit == MINUTES_UNIT {
            segment.push_str(&format!(" {}{MINUTES_UNIT}", entry.sets));
        } else {
            segment.push_str(&format!(" x{}{SETS_UNIT}", entry.sets));
        }
    }
    if !entry.notes.is_empty() {
        segment.push_str(&format!(" ({})", entry.notes));
    }
    segment
}

/// Joins the optional status segment and every entry segment.
#[must_use]
pub fn encode_content(status: &str, entries: &[LogEntry]) -> String {
    let mut segments = Vec::with_capacity(entries.len() + 1);
    if !status.is_empty() {
        segments.push(format!("[{status}]"));
    }
    segments.extend(entries.iter().map(encode_segment));
    segments.join(SEGMENT_SEPARATOR)
}

/// `<date>,"<content>"`, the form written to the sheet and the clipboard.
/// Quotes inside the content are doubled so the line stays valid CSV.
#[must_use]
pub fn encode_line(group: &DayGroup) -> String {
    let content = encode_content(&group.status, &group.entries);
    format!(
        "{},\"{}\"",
        group.date.format("%Y-%m-%d"),
        content.replace('"', "\"\"")
    )
}

/// Decodes a content string. Segments that do not fit the grammar are logged
/// and skipped; decoding itself never fails.
#[must_use]
pub fn decode_content(date: NaiveDate, content: &str, catalog: &Catalog) -> DecodedDay {
    let mut segments = content
        .split(SEGMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .peekable();

    let mut status = String::new();
    if let Some(first) = segments.peek() {
        if let Some(rest) = first.strip_prefix('[') {
            status = match rest.rfind(']') {
                Some(end) => rest[..end].to_string(),
                None => rest.to_string(),
            };
            segments.next();
        }
    }

    let mut entries = Vec::new();
    let mut dropped = Vec::new();
    for segment in segments {
        match decode_segment(date, segment, catalog) {
            Some(entry) => entries.push(entry),
            None => {
                warn!(%date, segment, "Dropping segment that does not match the log grammar");
                dropped.push(segment.to_string());
            }
        }
    }
    debug!(%date, entries = entries.len(), dropped = dropped.len(), "Decoded day content");

    DecodedDay {
        date,
        status,
        entries,
        dropped,
    }
}

fn decode_segment(date: NaiveDate, segment: &str, catalog: &Catalog) -> Option<LogEntry> {
    let caps = SEGMENT_RE.captures(segment)?;

    let exercise_name = caps.name("name")?.as_str().trim().to_string();
    let side = match caps.name("side") {
        Some(label) => Side::from_str(label.as_str()).ok()?,
        None => Side::NotApplicable,
    };

    let (sets, unit) = if let Some(n) = caps.name("sets") {
        (n.as_str().parse().ok()?, SETS_UNIT)
    } else if let Some(n) = caps.name("minutes") {
        (n.as_str().parse().ok()?, MINUTES_UNIT)
    } else {
        (0, COMPLETION_UNIT)
    };

    let category = match catalog.category_for(&exercise_name) {
        Some(category) => category.to_string(),
        None => {
            warn!(exercise = %exercise_name, "Exercise not in catalog, category left unresolved");
            UNRESOLVED_CATEGORY.to_string()
        }
    };

    Some(LogEntry {
        id: Uuid::new_v4().to_string(),
        date,
        exercise_name,
        category,
        side,
        sets,
        value: caps.name("value").map_or("", |m| m.as_str()).to_string(),
        unit: unit.to_string(),
        notes: caps
            .name("notes")
            .map_or(String::new(), |m| m.as_str().to_string()),
    })
}

/// Parses one exported `<date>,"<content>"` line. Returns `None` when the line
/// does not start with a date.
#[must_use]
pub fn decode_line(line: &str, catalog: &Catalog) -> Option<DecodedDay> {
    let (date_part, content_part) = line.trim().split_once(',')?;
    let date = NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").ok()?;

    let content_part = content_part.trim();
    let content = match content_part
        .strip_prefix('"')
        .and_then(|c| c.strip_suffix('"'))
    {
        Some(quoted) => quoted.replace("\"\"", "\""),
        None => content_part.to_string(),
    };
    Some(decode_content(date, &content, catalog))
}

/// Newline-joined export lines, one per day-group, in the order given.
#[must_use]
pub fn export_text(groups: &[DayGroup]) -> String {
    groups
        .iter()
        .map(encode_line)
        .collect::<Vec<_>>()
        .join("\n")
}
