// src/cli.rs
use chrono::{Duration, Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI tool to keep a rehab exercise log", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[arg(long, global = true)]
    pub export_csv: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideCli {
    Left,
    Right,
    Both,
}

// Custom parser for date strings and shorthands
pub fn parse_date_shorthand(s: &str) -> Result<NaiveDate, String> {
    match s.to_lowercase().as_str() {
        "today" => Ok(Local::now().date_naive()),
        "yesterday" => Ok((Local::now() - Duration::days(1)).date_naive()),
        _ => {
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date)
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
                Ok(date)
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%d.%m.%Y") {
                Ok(date)
            } else {
                Err(format!(
                    "Invalid date format: '{s}'. Use 'today', 'yesterday', YYYY-MM-DD, YYYY/MM/DD, or DD.MM.YYYY."
                ))
            }
        }
    }
}

/// Quantity flags shared by `add` and `edit`. Flags that do not belong to the
/// exercise's mode are ignored.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Load in kg (STRENGTH)
    #[arg(short, long)]
    pub weight: Option<String>,
    /// Repetitions per set (STRENGTH, REPS_ONLY)
    #[arg(short, long)]
    pub reps: Option<u32>,
    /// Hold time in seconds (TIME_ONLY)
    #[arg(long)]
    pub seconds: Option<u32>,
    /// Resistance level (CYCLING)
    #[arg(long)]
    pub resistance: Option<String>,
    /// Incline (TREADMILL)
    #[arg(long)]
    pub slope: Option<String>,
    /// Speed (TREADMILL)
    #[arg(long)]
    pub speed: Option<String>,
    /// Duration in minutes (CYCLING, TREADMILL)
    #[arg(short, long)]
    pub minutes: Option<u32>,
    /// Number of sets
    #[arg(short, long)]
    pub sets: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log an exercise (and optionally the day's status note)
    Add {
        /// Exercise ID or name
        #[arg(short, long)]
        exercise: String,
        /// Date of the session ('today', 'yesterday', YYYY-MM-DD, ...)
        #[arg(short, long, default_value = "today", value_parser = parse_date_shorthand)]
        date: NaiveDate,
        /// Side trained, for unilateral exercises
        #[arg(long, value_enum)]
        side: Option<SideCli>,
        #[command(flatten)]
        inputs: InputArgs,
        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Status note for the day, saved together with the entry
        #[arg(long)]
        status: Option<String>,
    },
    /// Set or clear the status note of a day
    Status {
        /// New status text; an empty string clears it
        text: String,
        #[arg(short, long, default_value = "today", value_parser = parse_date_shorthand)]
        date: NaiveDate,
    },
    /// Edit an existing log entry
    Edit {
        /// ID of the entry to edit
        id: String,
        /// Switch the entry to another exercise (ID or name)
        #[arg(short, long)]
        exercise: Option<String>,
        /// Move the entry to another date
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
        #[arg(long, value_enum)]
        side: Option<SideCli>,
        #[command(flatten)]
        inputs: InputArgs,
        /// New notes; an empty string clears them
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete one log entry
    Delete {
        /// ID of the entry to delete
        id: String,
    },
    /// Delete every entry and the status of a day
    DeleteDay {
        #[arg(value_parser = parse_date_shorthand)]
        date: NaiveDate,
    },
    /// Delete the whole log
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List log entries grouped by day
    List {
        /// Show only one day
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
        /// Show only the newest N days
        #[arg(short = 'n', long, conflicts_with = "date")]
        limit_days: Option<usize>,
    },
    /// List the exercise catalog by category
    Exercises {
        /// Case-insensitive filter on name or category
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Print day-lines (`<date>,"<content>"`) for pasting elsewhere
    Export {
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
    },
    /// Print the human-readable report of every day
    Report,
    /// Restore days from a file of exported day-lines
    Import {
        file: PathBuf,
    },
    /// Talk to the remote sheet
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Set the remote endpoint URL
    SetEndpoint {
        url: String,
    },
    /// Set the request timeout in seconds
    SetTimeout {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        seconds: u64,
    },
    /// Set the table header color
    SetHeaderColor {
        color: String,
    },
    /// Show the path to the config file
    ConfigPath,
    /// Show the path to the database file
    DbPath,
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SyncAction {
    /// Download the exercise catalog
    Catalog,
    /// Upload one day
    Push {
        #[arg(default_value = "today", value_parser = parse_date_shorthand)]
        date: NaiveDate,
    },
    /// Download the history and replace the matching local days
    Restore,
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, NaiveDate};

    #[test]
    fn test_date_parsing_today() {
        let result = parse_date_shorthand("today").unwrap();
        assert_eq!(result, Local::now().date_naive());
    }

    #[test]
    fn test_date_parsing_yesterday() {
        let result = parse_date_shorthand("yesterday").unwrap();
        assert_eq!(result, Local::now().date_naive() - Duration::days(1));
    }

    #[test]
    fn test_date_parsing_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        assert_eq!(parse_date_shorthand("2026-02-04").unwrap(), expected);
        assert_eq!(parse_date_shorthand("2026/02/04").unwrap(), expected);
        assert_eq!(parse_date_shorthand("04.02.2026").unwrap(), expected);
    }

    #[test]
    fn test_date_parsing_invalid() {
        assert!(parse_date_shorthand("04-02-2026").is_err());
        assert!(parse_date_shorthand("someday").is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_add_parses_mode_flags() {
        let cli = Cli::try_parse_from([
            "rehab-log", "add", "-e", "深蹲", "-d", "2026-02-04", "-w", "20", "-r", "12", "-s", "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                exercise,
                date,
                inputs,
                ..
            } => {
                assert_eq!(exercise, "深蹲");
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 4).unwrap());
                assert_eq!(inputs.weight.as_deref(), Some("20"));
                assert_eq!(inputs.reps, Some(12));
                assert_eq!(inputs.sets, Some(4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
