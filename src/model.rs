// src/model.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

/// Body side a unilateral movement was performed on.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter,
)]
pub enum Side {
    #[serde(rename = "左")]
    #[strum(to_string = "左")]
    Left,
    #[serde(rename = "右")]
    #[strum(to_string = "右")]
    Right,
    #[serde(rename = "雙側")]
    #[strum(to_string = "雙側")]
    Both,
    #[default]
    #[serde(rename = "N/A")]
    #[strum(to_string = "N/A")]
    NotApplicable,
}

/// One recorded performance of one exercise on one date.
///
/// `exercise_name` and `category` are copies taken when the entry was created;
/// editing and decoding re-resolve the exercise by name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub date: NaiveDate,
    pub exercise_name: String,
    pub category: String,
    pub side: Side,
    /// Set count for discrete modes, elapsed minutes for duration modes.
    pub sets: i64,
    pub value: String,
    pub unit: String,
    #[serde(default)]
    pub notes: String,
}

pub type DailyStatuses = BTreeMap<NaiveDate, String>;

/// All entries plus the status note sharing one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub status: String,
    pub entries: Vec<LogEntry>,
}

impl DayGroup {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            status: String::new(),
            entries: Vec::new(),
        }
    }
}

/// Buckets entries by date (keeping list order inside a bucket) and attaches
/// each date's status. Dates that only carry a status still get a bucket.
/// Buckets are returned newest first.
#[must_use]
pub fn group_by_day(logs: &[LogEntry], statuses: &DailyStatuses) -> Vec<DayGroup> {
    let mut buckets: BTreeMap<NaiveDate, DayGroup> = BTreeMap::new();

    for entry in logs {
        buckets
            .entry(entry.date)
            .or_insert_with(|| DayGroup::new(entry.date))
            .entries
            .push(entry.clone());
    }
    for (date, status) in statuses {
        if status.trim().is_empty() {
            continue;
        }
        buckets
            .entry(*date)
            .or_insert_with(|| DayGroup::new(*date))
            .status = status.clone();
    }

    buckets.into_values().rev().collect()
}
