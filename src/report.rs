// src/report.rs
//! Human-readable day report for pasting into chats or documents.
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::catalog::{Catalog, ExerciseMode};
use crate::model::{DayGroup, LogEntry, Side};

const TABLE_HEADER: &str = "動作項目\t側邊\t負重\t表現\t組數\t備註";
const EMPTY_STATUS: &str = "未填寫";

static WEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)kg").expect("weight pattern is valid"));
static REPS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\D*$").expect("reps pattern is valid"));

/// Renders every group as a titled, tab-separated table.
#[must_use]
pub fn render(groups: &[DayGroup], catalog: &Catalog) -> String {
    let separator = format!("\n\n{}\n\n", "─".repeat(30));
    groups
        .iter()
        .map(|group| render_group(group, catalog))
        .collect::<Vec<_>>()
        .join(&separator)
}

fn render_group(group: &DayGroup, catalog: &Catalog) -> String {
    let status = if group.status.trim().is_empty() {
        EMPTY_STATUS
    } else {
        group.status.as_str()
    };
    let rows: Vec<String> = group
        .entries
        .iter()
        .map(|entry| render_row(entry, catalog))
        .collect();

    format!(
        "📅 【{} 復健日誌】\n🧠 今日狀況：{}\n\n{}\n{}",
        group.date.format("%Y-%m-%d"),
        status,
        TABLE_HEADER,
        rows.join("\n")
    )
}

fn render_row(entry: &LogEntry, catalog: &Catalog) -> String {
    let side = match entry.side {
        Side::Left | Side::Right => entry.side.to_string(),
        Side::Both | Side::NotApplicable => Side::Both.to_string(),
    };

    let (load, performance) = match catalog.find_by_name(&entry.exercise_name).map(|d| d.mode) {
        Some(ExerciseMode::Strength) => {
            let load = WEIGHT_RE
                .captures(&entry.value)
                .and_then(|c| c.get(1))
                .map_or_else(|| "0公斤".to_string(), |w| format!("{}公斤", w.as_str()));
            let reps_text = entry.value.rsplit(' ').next().unwrap_or(&entry.value);
            let performance = if REPS_RE.is_match(reps_text) {
                reps_text.to_string()
            } else {
                entry.value.clone()
            };
            (load, performance)
        }
        Some(mode) if mode.is_duration() => {
            (entry.value.clone(), format!("{}{}", entry.sets, entry.unit))
        }
        Some(_) => ("-".to_string(), entry.value.clone()),
        None => ("-".to_string(), "-".to_string()),
    };
    // The sets column is printed for every mode, including duration and relax rows.
    let sets = format!("{}組", entry.sets);

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        entry.exercise_name, side, load, performance, sets, entry.notes
    )
}
