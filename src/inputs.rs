// src/inputs.rs
//! Per-mode form inputs.
//!
//! Each [`ExerciseMode`] captures a different set of quantities. They are
//! formatted into the single `value`/`sets`/`unit` triple stored on a
//! [`LogEntry`], and recovered from it again through [`GRAMMARS`] when an entry
//! is edited.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use thiserror::Error;

use crate::catalog::{ExerciseDefinition, ExerciseMode};
use crate::codec::{COMPLETION_UNIT, MINUTES_UNIT, SETS_UNIT};
use crate::model::LogEntry;

pub const RELAX_VALUE: &str = "已完成";

const SEED_REPS: u32 = 10;
const SEED_SECONDS: u32 = 30;
const SEED_MINUTES: u32 = 15;
const SEED_SETS: u32 = 3;

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("decimal pattern is valid"));

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid {field}: '{value}'")]
    InvalidInput { field: &'static str, value: String },
    #[error("Inputs for {found} do not fit exercise mode {expected}")]
    ModeMismatch {
        expected: ExerciseMode,
        found: ExerciseMode,
    },
}

/// The quantities captured for one entry, shaped by the exercise's mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeInputs {
    Strength {
        weight: Option<String>,
        reps: u32,
        sets: u32,
    },
    RepsOnly {
        reps: u32,
        sets: u32,
    },
    TimeOnly {
        seconds: u32,
        sets: u32,
    },
    Cycling {
        resistance: String,
        minutes: u32,
    },
    Treadmill {
        slope: String,
        speed: String,
        minutes: u32,
    },
    Relax,
}

/// What gets written onto a [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedValue {
    pub value: String,
    pub sets: i64,
    pub unit: String,
}

/// Field values supplied by the user on top of a seeded or reconstructed form.
/// Fields that do not exist for the active mode are ignored.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub weight: Option<String>,
    pub reps: Option<u32>,
    pub seconds: Option<u32>,
    pub resistance: Option<String>,
    pub slope: Option<String>,
    pub speed: Option<String>,
    pub minutes: Option<u32>,
    pub sets: Option<u32>,
}

impl ModeInputs {
    #[must_use]
    pub const fn mode(&self) -> ExerciseMode {
        match self {
            Self::Strength { .. } => ExerciseMode::Strength,
            Self::RepsOnly { .. } => ExerciseMode::RepsOnly,
            Self::TimeOnly { .. } => ExerciseMode::TimeOnly,
            Self::Cycling { .. } => ExerciseMode::Cycling,
            Self::Treadmill { .. } => ExerciseMode::Treadmill,
            Self::Relax => ExerciseMode::Relax,
        }
    }

    /// Default form values for a freshly selected exercise.
    #[must_use]
    pub fn seed(def: &ExerciseDefinition) -> Self {
        let quantity = def.default_quantity;
        match def.mode {
            ExerciseMode::Strength => Self::Strength {
                weight: None,
                reps: quantity.unwrap_or(SEED_REPS),
                sets: SEED_SETS,
            },
            ExerciseMode::RepsOnly => Self::RepsOnly {
                reps: quantity.unwrap_or(SEED_REPS),
                sets: SEED_SETS,
            },
            ExerciseMode::TimeOnly => Self::TimeOnly {
                seconds: quantity.unwrap_or(SEED_SECONDS),
                sets: SEED_SETS,
            },
            ExerciseMode::Cycling => Self::Cycling {
                resistance: String::new(),
                minutes: quantity.unwrap_or(SEED_MINUTES),
            },
            ExerciseMode::Treadmill => Self::Treadmill {
                slope: String::new(),
                speed: String::new(),
                minutes: quantity.unwrap_or(SEED_MINUTES),
            },
            ExerciseMode::Relax => Self::Relax,
        }
    }

    pub fn apply(&mut self, overrides: &InputOverrides) {
        let o = overrides;
        match self {
            Self::Strength { weight, reps, sets } => {
                if let Some(w) = &o.weight {
                    *weight = Some(w.trim().to_string()).filter(|w| !w.is_empty());
                }
                replace(reps, o.reps);
                replace(sets, o.sets);
            }
            Self::RepsOnly { reps, sets } => {
                replace(reps, o.reps);
                replace(sets, o.sets);
            }
            Self::TimeOnly { seconds, sets } => {
                replace(seconds, o.seconds);
                replace(sets, o.sets);
            }
            Self::Cycling {
                resistance,
                minutes,
            } => {
                replace(resistance, o.resistance.as_ref().map(|r| r.trim().to_string()));
                replace(minutes, o.minutes);
            }
            Self::Treadmill {
                slope,
                speed,
                minutes,
            } => {
                replace(slope, o.slope.as_ref().map(|s| s.trim().to_string()));
                replace(speed, o.speed.as_ref().map(|s| s.trim().to_string()));
                replace(minutes, o.minutes);
            }
            Self::Relax => {}
        }
    }

    /// Validates the inputs against `def` and renders the stored triple.
    ///
    /// # Errors
    /// - `InputError::ModeMismatch` if the variant does not belong to `def.mode`.
    /// - `InputError::InvalidInput` for non-decimal measurements or zero counts.
    pub fn format(&self, def: &ExerciseDefinition) -> Result<FormattedValue, InputError> {
        if self.mode() != def.mode {
            return Err(InputError::ModeMismatch {
                expected: def.mode,
                found: self.mode(),
            });
        }

        let formatted = match self {
            Self::Strength { weight, reps, sets } => {
                let reps = positive("reps", *reps)?;
                let value = match weight {
                    Some(w) => format!("{}kg {reps}{}", decimal("weight", w)?, def.reps_unit()),
                    None => format!("{reps}{}", def.reps_unit()),
                };
                counted(value, positive("sets", *sets)?)
            }
            Self::RepsOnly { reps, sets } => counted(
                format!("{}{}", positive("reps", *reps)?, def.reps_unit()),
                positive("sets", *sets)?,
            ),
            Self::TimeOnly { seconds, sets } => counted(
                format!("{}秒", positive("seconds", *seconds)?),
                positive("sets", *sets)?,
            ),
            Self::Cycling {
                resistance,
                minutes,
            } => timed(
                format!("阻力{}", decimal("resistance", resistance)?),
                positive("minutes", *minutes)?,
            ),
            Self::Treadmill {
                slope,
                speed,
                minutes,
            } => timed(
                format!(
                    "坡度{} 速度{}",
                    decimal("slope", slope)?,
                    decimal("speed", speed)?
                ),
                positive("minutes", *minutes)?,
            ),
            Self::Relax => FormattedValue {
                value: RELAX_VALUE.to_string(),
                sets: 0,
                unit: COMPLETION_UNIT.to_string(),
            },
        };
        Ok(formatted)
    }

    /// Rebuilds form inputs from a stored entry using the grammar row for the
    /// exercise's mode, falling back to the row's lenient reading when the value
    /// does not have the expected shape.
    #[must_use]
    pub fn from_entry(def: &ExerciseDefinition, entry: &LogEntry) -> Self {
        let Some(grammar) = GRAMMARS.iter().find(|g| g.mode == def.mode) else {
            return Self::seed(def);
        };

        match grammar.pattern.captures(entry.value.trim()) {
            Some(caps) => (grammar.build)(&caps, entry),
            None => (grammar.fallback)(entry),
        }
    }
}

fn replace<T>(slot: &mut T, new: Option<T>) {
    if let Some(v) = new {
        *slot = v;
    }
}

fn positive(field: &'static str, n: u32) -> Result<u32, InputError> {
    if n == 0 {
        return Err(InputError::InvalidInput {
            field,
            value: n.to_string(),
        });
    }
    Ok(n)
}

fn decimal<'a>(field: &'static str, text: &'a str) -> Result<&'a str, InputError> {
    let trimmed = text.trim();
    if DECIMAL_RE.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(InputError::InvalidInput {
            field,
            value: text.to_string(),
        })
    }
}

fn counted(value: String, sets: u32) -> FormattedValue {
    FormattedValue {
        value,
        sets: i64::from(sets),
        unit: SETS_UNIT.to_string(),
    }
}

fn timed(value: String, minutes: u32) -> FormattedValue {
    FormattedValue {
        value,
        sets: i64::from(minutes),
        unit: MINUTES_UNIT.to_string(),
    }
}

/// Inverse-parse rule for one mode.
pub struct Grammar {
    pub mode: ExerciseMode,
    pub pattern: Regex,
    build: fn(&Captures<'_>, &LogEntry) -> ModeInputs,
    fallback: fn(&LogEntry) -> ModeInputs,
}

fn stored_count(entry: &LogEntry) -> u32 {
    u32::try_from(entry.sets).unwrap_or(0)
}

fn leading_number(text: &str) -> u32 {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

fn group(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map_or(String::new(), |m| m.as_str().to_string())
}

fn group_number(caps: &Captures<'_>, name: &str) -> u32 {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// One row per mode. Adding a mode means adding a row here and a formatting
/// arm in [`ModeInputs::format`].
pub static GRAMMARS: Lazy<Vec<Grammar>> = Lazy::new(|| {
    let re = |p: &str| Regex::new(p).expect("grammar pattern is valid");
    vec![
        Grammar {
            mode: ExerciseMode::Strength,
            pattern: re(r"^(?:(?P<weight>\d+(?:\.\d+)?)kg\s+)?(?P<reps>\d+)\D*$"),
            build: |caps, entry| ModeInputs::Strength {
                weight: caps.name("weight").map(|m| m.as_str().to_string()),
                reps: group_number(caps, "reps"),
                sets: stored_count(entry),
            },
            fallback: |entry| ModeInputs::Strength {
                weight: None,
                reps: leading_number(&entry.value),
                sets: stored_count(entry),
            },
        },
        Grammar {
            mode: ExerciseMode::RepsOnly,
            pattern: re(r"^(?P<reps>\d+)\D*$"),
            build: |caps, entry| ModeInputs::RepsOnly {
                reps: group_number(caps, "reps"),
                sets: stored_count(entry),
            },
            fallback: |entry| ModeInputs::RepsOnly {
                reps: leading_number(&entry.value),
                sets: stored_count(entry),
            },
        },
        Grammar {
            mode: ExerciseMode::TimeOnly,
            pattern: re(r"^(?P<seconds>\d+)秒$"),
            build: |caps, entry| ModeInputs::TimeOnly {
                seconds: group_number(caps, "seconds"),
                sets: stored_count(entry),
            },
            fallback: |entry| ModeInputs::TimeOnly {
                seconds: leading_number(&entry.value),
                sets: stored_count(entry),
            },
        },
        Grammar {
            mode: ExerciseMode::Cycling,
            pattern: re(r"^阻力(?P<resistance>.*)$"),
            build: |caps, entry| ModeInputs::Cycling {
                resistance: group(caps, "resistance").trim().to_string(),
                minutes: stored_count(entry),
            },
            fallback: |entry| ModeInputs::Cycling {
                resistance: entry.value.trim().to_string(),
                minutes: stored_count(entry),
            },
        },
        Grammar {
            mode: ExerciseMode::Treadmill,
            pattern: re(r"^坡度(?P<slope>[\d.]+)\s+速度(?P<speed>[\d.]+)$"),
            build: |caps, entry| ModeInputs::Treadmill {
                slope: group(caps, "slope"),
                speed: group(caps, "speed"),
                minutes: stored_count(entry),
            },
            fallback: |entry| ModeInputs::Treadmill {
                slope: entry.value.trim().to_string(),
                speed: String::new(),
                minutes: stored_count(entry),
            },
        },
        Grammar {
            mode: ExerciseMode::Relax,
            pattern: re(r"^已完成$"),
            build: |_, _| ModeInputs::Relax,
            fallback: |_| ModeInputs::Relax,
        },
    ]
});
