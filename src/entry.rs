// src/entry.rs
use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::{Catalog, ExerciseDefinition};
use crate::inputs::{InputError, ModeInputs};
use crate::model::{LogEntry, Side};

#[derive(Error, Debug)]
pub enum Error {
    #[error("No exercise selected. Pick an exercise (or refresh the catalog) or enter a status note.")]
    NoExerciseSelected,
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(String),
    #[error("Log entry not found: ID {0}")]
    EntryNotFound(String),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("No log entry is currently being edited")]
    NotEditing,
    #[error("Failed to persist log: {0}")]
    Store(#[from] crate::db::Error),
}

/// Side actually stored for `def`: non-unilateral movements are always
/// `N/A`, unilateral ones default to both sides when no side was picked.
#[must_use]
pub fn resolve_side(def: &ExerciseDefinition, requested: Side) -> Side {
    if !def.is_unilateral {
        Side::NotApplicable
    } else if requested == Side::NotApplicable {
        Side::Both
    } else {
        requested
    }
}

/// The contents of the entry form, before it is turned into a [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub exercise_id: String,
    pub side: Side,
    pub inputs: ModeInputs,
    pub notes: String,
}

impl EntryDraft {
    /// Blank form for `def`, seeded with the mode's defaults.
    #[must_use]
    pub fn new(def: &ExerciseDefinition, date: NaiveDate) -> Self {
        Self {
            date,
            exercise_id: def.id.clone(),
            side: resolve_side(def, Side::NotApplicable),
            inputs: ModeInputs::seed(def),
            notes: String::new(),
        }
    }

    /// Form populated from an existing entry. The exercise is looked up by the
    /// entry's stored name.
    ///
    /// # Errors
    /// Returns `Error::ExerciseNotFound` if no catalog entry carries that name.
    pub fn from_entry(catalog: &Catalog, entry: &LogEntry) -> Result<Self, Error> {
        let def = catalog
            .find_by_name(&entry.exercise_name)
            .ok_or_else(|| Error::ExerciseNotFound(entry.exercise_name.clone()))?;

        Ok(Self {
            date: entry.date,
            exercise_id: def.id.clone(),
            side: entry.side,
            inputs: ModeInputs::from_entry(def, entry),
            notes: entry.notes.clone(),
        })
    }

    /// Switches the form to another exercise. Inputs are re-seeded when the
    /// mode changes, since the old fields no longer apply.
    pub fn select_exercise(&mut self, def: &ExerciseDefinition) {
        self.exercise_id = def.id.clone();
        if self.inputs.mode() != def.mode {
            self.inputs = ModeInputs::seed(def);
        }
        self.side = resolve_side(def, self.side);
    }

    /// Validates the form and renders a log entry with the given id.
    ///
    /// # Errors
    /// - `Error::NoExerciseSelected` if the catalog is empty.
    /// - `Error::ExerciseNotFound` if `exercise_id` is not in the catalog.
    /// - `Error::Input` if the inputs do not validate for the exercise's mode.
    pub fn build(&self, catalog: &Catalog, id: String) -> Result<LogEntry, Error> {
        if catalog.is_empty() {
            return Err(Error::NoExerciseSelected);
        }
        let def = catalog
            .find_by_id(&self.exercise_id)
            .ok_or_else(|| Error::ExerciseNotFound(self.exercise_id.clone()))?;
        let formatted = self.inputs.format(def)?;

        Ok(LogEntry {
            id,
            date: self.date,
            exercise_name: def.name.clone(),
            category: def.category.clone(),
            side: resolve_side(def, self.side),
            sets: formatted.sets,
            value: formatted.value,
            unit: formatted.unit,
            notes: self.notes.trim().to_string(),
        })
    }
}

/// The single edit cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub entry_id: String,
    pub draft: EntryDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

impl EditState {
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    #[must_use]
    pub const fn session(&self) -> Option<&EditSession> {
        match self {
            Self::Editing(session) => Some(session),
            Self::Idle => None,
        }
    }
}
