// src/catalog.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::warn;

/// Unit appended to repetition counts when the exercise defines no override.
pub const DEFAULT_REPS_UNIT: &str = "下";

/// Input-shape discriminator for an exercise. Decides which fields a log entry
/// captures and how its value string is formatted.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseMode {
    Strength,
    RepsOnly,
    TimeOnly,
    Cycling,
    Treadmill,
    Relax,
}

impl ExerciseMode {
    /// Duration modes store elapsed minutes in `sets`.
    #[must_use]
    pub const fn is_duration(self) -> bool {
        matches!(self, Self::Cycling | Self::Treadmill)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    pub is_unilateral: bool,
    pub mode: ExerciseMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_quantity: Option<u32>,
}

impl ExerciseDefinition {
    /// Label used after repetition counts, e.g. "下", "場" or "趟".
    #[must_use]
    pub fn reps_unit(&self) -> &str {
        self.default_unit
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_REPS_UNIT)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("Catalog row is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Unknown exercise mode '{0}'")]
    UnknownMode(String),
    #[error("Invalid default quantity '{0}'")]
    InvalidQuantity(String),
}

/// One row of the remote exercise sheet. The sheet is read as display values,
/// so every cell may arrive as text regardless of its logical type.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogRow {
    pub id: Value,
    pub name: Value,
    pub category: Value,
    pub is_unilateral: Value,
    pub mode: Value,
    pub default_unit: Value,
    pub default_quantity: Value,
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn cell_flag(cell: &Value) -> bool {
    match cell {
        Value::Bool(b) => *b,
        other => matches!(cell_text(other).as_str(), "TRUE" | "true" | "是"),
    }
}

impl TryFrom<CatalogRow> for ExerciseDefinition {
    type Error = RowError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let id = cell_text(&row.id);
        if id.is_empty() {
            return Err(RowError::MissingField("id"));
        }
        let name = cell_text(&row.name);
        if name.is_empty() {
            return Err(RowError::MissingField("name"));
        }

        let mode_text = cell_text(&row.mode);
        let mode = ExerciseMode::from_str(&mode_text.to_uppercase())
            .map_err(|_| RowError::UnknownMode(mode_text.clone()))?;

        let default_unit = Some(cell_text(&row.default_unit)).filter(|u| !u.is_empty());
        let quantity_text = cell_text(&row.default_quantity);
        let default_quantity = if quantity_text.is_empty() {
            None
        } else {
            Some(
                quantity_text
                    .parse::<u32>()
                    .map_err(|_| RowError::InvalidQuantity(quantity_text.clone()))?,
            )
        };

        Ok(Self {
            id,
            name,
            category: cell_text(&row.category),
            is_unilateral: cell_flag(&row.is_unilateral),
            mode,
            default_unit,
            default_quantity,
        })
    }
}

/// Ordered, read-only set of exercise definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    definitions: Vec<ExerciseDefinition>,
}

impl Catalog {
    #[must_use]
    pub fn new(definitions: Vec<ExerciseDefinition>) -> Self {
        Self { definitions }
    }

    /// Converts raw sheet rows, skipping (and logging) rows that cannot be used.
    #[must_use]
    pub fn from_rows(rows: Vec<CatalogRow>) -> Self {
        let definitions = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match ExerciseDefinition::try_from(row) {
                Ok(def) => Some(def),
                Err(e) => {
                    warn!(row = index + 1, error = %e, "Skipping catalog row");
                    None
                }
            })
            .collect();
        Self { definitions }
    }

    #[must_use]
    pub fn definitions(&self) -> &[ExerciseDefinition] {
        &self.definitions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Category labels in the order they first appear.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for def in &self.definitions {
            if !seen.contains(&def.category.as_str()) {
                seen.push(&def.category);
            }
        }
        seen
    }

    /// Definitions grouped by category, optionally filtered by a
    /// case-insensitive substring of the name or category. Empty groups are
    /// left out.
    #[must_use]
    pub fn grouped(&self, filter: Option<&str>) -> Vec<(&str, Vec<&ExerciseDefinition>)> {
        let needle = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        self.categories()
            .into_iter()
            .filter_map(|category| {
                let members: Vec<&ExerciseDefinition> = self
                    .definitions
                    .iter()
                    .filter(|def| def.category == category)
                    .filter(|def| match &needle {
                        Some(n) => {
                            def.name.to_lowercase().contains(n)
                                || def.category.to_lowercase().contains(n)
                        }
                        None => true,
                    })
                    .collect();
                (!members.is_empty()).then_some((category, members))
            })
            .collect()
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.definitions.iter().find(|def| def.id == id)
    }

    /// Exact name lookup. Log entries reference exercises by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ExerciseDefinition> {
        self.definitions.iter().find(|def| def.name == name)
    }

    /// Resolves a user-supplied identifier: id first, then name ignoring case.
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> Option<&ExerciseDefinition> {
        let trimmed = identifier.trim();
        self.find_by_id(trimmed).or_else(|| {
            self.definitions
                .iter()
                .find(|def| def.name.to_lowercase() == trimmed.to_lowercase())
        })
    }

    #[must_use]
    pub fn category_for(&self, exercise_name: &str) -> Option<&str> {
        self.find_by_name(exercise_name)
            .map(|def| def.category.as_str())
    }
}
