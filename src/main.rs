//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdin, stdout, Write};
use tracing_subscriber::EnvFilter;

use rehab_log_lib::{
    parse_color, AppService, Catalog, DayGroup, EntryError, InputOverrides, Side,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli_args = cli::parse_args();
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    let header_color: Color = parse_color(&service.config.theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green);

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }

        // --- Log entry commands ---
        cli::Commands::Add {
            exercise,
            date,
            side,
            inputs,
            notes,
            status,
        } => {
            let mut draft = service.new_draft(&exercise, date)?;
            draft.inputs.apply(&to_overrides(&inputs));
            if let Some(side) = side {
                draft.side = to_side(side);
            }
            draft.notes = notes.unwrap_or_default();

            match service.submit(date, Some(&draft), status.as_deref()) {
                Ok(outcome) => {
                    if let Some(entry) = outcome.entry {
                        println!(
                            "Logged '{}' on {} (ID: {})",
                            entry.exercise_name, entry.date, entry.id
                        );
                    }
                    if outcome.status_changed {
                        println!("Status for {date} updated.");
                    }
                }
                Err(e) => bail!("Error adding entry: {e}"),
            }
        }
        cli::Commands::Status { text, date } => match service.set_status(date, &text) {
            Ok(true) if text.trim().is_empty() => println!("Status for {date} cleared."),
            Ok(true) => println!("Status for {date} set."),
            Ok(false) => println!("Status for {date} unchanged."),
            Err(e) => bail!("Error saving status: {e}"),
        },
        cli::Commands::Edit {
            id,
            exercise,
            date,
            side,
            inputs,
            notes,
        } => {
            let mut draft = service
                .begin_edit(&id)
                .with_context(|| format!("Cannot edit entry {id}"))?;
            if let Some(identifier) = exercise {
                let def = service.resolve_exercise(&identifier)?.clone();
                draft.select_exercise(&def);
            }
            if let Some(date) = date {
                draft.date = date;
            }
            if let Some(side) = side {
                draft.side = to_side(side);
            }
            draft.inputs.apply(&to_overrides(&inputs));
            if let Some(notes) = notes {
                draft.notes = notes;
            }

            match service.save_edit(&draft) {
                Ok(entry) => println!("Updated entry {} ('{}').", entry.id, entry.exercise_name),
                Err(e) => {
                    service.cancel_edit();
                    bail!("Error editing entry {id}: {e}");
                }
            }
        }
        cli::Commands::Delete { id } => match service.delete_entry(&id) {
            Ok(entry) => println!(
                "Deleted '{}' on {} (ID: {}).",
                entry.exercise_name, entry.date, entry.id
            ),
            Err(EntryError::EntryNotFound(_)) => bail!("No log entry with ID {id}"),
            Err(e) => bail!("Error deleting entry: {e}"),
        },
        cli::Commands::DeleteDay { date } => {
            let removed = service.delete_day(date)?;
            println!("Deleted {removed} entries and the status for {date}.");
        }
        cli::Commands::Clear { yes } => {
            if !yes && !confirm("Delete every log entry and status note?")? {
                println!("Aborted.");
                return Ok(());
            }
            service.clear_all()?;
            println!("Log cleared.");
        }

        // --- Reading ---
        cli::Commands::List { date, limit_days } => {
            let groups: Vec<DayGroup> = match (date, limit_days) {
                (Some(d), _) => service.day_group(d).into_iter().collect(),
                (None, Some(n)) => service.day_groups().into_iter().take(n).collect(),
                (None, None) => service.day_groups(),
            };
            if groups.is_empty() {
                println!("No log entries found.");
            } else if export_csv {
                print_groups_csv(&groups)?;
            } else {
                print_groups_table(&groups, header_color);
            }
        }
        cli::Commands::Exercises { filter } => {
            let catalog = service.catalog();
            if catalog.is_empty() {
                println!("The exercise catalog is empty. Run 'sync catalog' to download it.");
            } else if export_csv {
                print_catalog_csv(catalog, filter.as_deref())?;
            } else {
                print_catalog_table(catalog, filter.as_deref(), header_color);
            }
        }
        cli::Commands::Export { date } => match date {
            Some(d) => match service.export_day(d) {
                Some(line) => println!("{line}"),
                None => println!("Nothing recorded on {d}."),
            },
            None => println!("{}", service.export_all()),
        },
        cli::Commands::Report => println!("{}", service.report_all()),
        cli::Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let summary = service.import_export_text(&text)?;
            println!(
                "Imported {} days ({} entries).",
                summary.days, summary.entries
            );
            for segment in &summary.dropped {
                eprintln!("Skipped unreadable segment: {segment}");
            }
        }

        // --- Remote ---
        cli::Commands::Sync { action } => {
            let client = service.sync_client()?;
            match action {
                cli::SyncAction::Catalog => {
                    let count = service.refresh_catalog(&client).await?;
                    println!("Catalog updated: {count} exercises.");
                }
                cli::SyncAction::Push { date } => {
                    let reply = service.push_day(&client, date).await?;
                    println!("Uploaded {date}: {reply}");
                }
                cli::SyncAction::Restore => {
                    let summary = service.restore_from_remote(&client).await?;
                    println!(
                        "Restored {} days ({} entries) from {}.",
                        summary.days,
                        summary.entries,
                        client.endpoint()
                    );
                    for segment in &summary.dropped {
                        eprintln!("Skipped unreadable segment: {segment}");
                    }
                }
            }
        }

        // --- Configuration ---
        cli::Commands::SetEndpoint { url } => {
            service.set_endpoint(&url)?;
            println!("Endpoint set to {url}");
        }
        cli::Commands::SetTimeout { seconds } => {
            service.set_request_timeout(seconds)?;
            println!("Request timeout set to {seconds}s.");
        }
        cli::Commands::SetHeaderColor { color } => {
            service.set_header_color(&color)?;
            println!("Header color set to {}.", service.config.theme.header_color);
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
    }

    Ok(())
}

fn to_overrides(args: &cli::InputArgs) -> InputOverrides {
    InputOverrides {
        weight: args.weight.clone(),
        reps: args.reps,
        seconds: args.seconds,
        resistance: args.resistance.clone(),
        slope: args.slope.clone(),
        speed: args.speed.clone(),
        minutes: args.minutes,
        sets: args.sets,
    }
}

const fn to_side(side: cli::SideCli) -> Side {
    match side {
        cli::SideCli::Left => Side::Left,
        cli::SideCli::Right => Side::Right,
        cli::SideCli::Both => Side::Both,
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    stdout().flush()?;
    let mut answer = String::new();
    stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prints each day as its own table, newest first.
fn print_groups_table(groups: &[DayGroup], header_color: Color) {
    for group in groups {
        if group.status.is_empty() {
            println!("{}", group.date.format("%Y-%m-%d"));
        } else {
            println!("{}  [{}]", group.date.format("%Y-%m-%d"), group.status);
        }
        if group.entries.is_empty() {
            println!("  (status only)\n");
            continue;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ID").fg(header_color),
                Cell::new("Exercise").fg(header_color),
                Cell::new("Category").fg(header_color),
                Cell::new("Side").fg(header_color),
                Cell::new("Value").fg(header_color),
                Cell::new("Sets/Min").fg(header_color),
                Cell::new("Notes").fg(header_color),
            ]);

        for entry in &group.entries {
            let side = match entry.side {
                Side::NotApplicable => "-".to_string(),
                other => other.to_string(),
            };
            let count = if entry.sets > 0 {
                format!("{}{}", entry.sets, entry.unit)
            } else {
                "-".to_string()
            };
            table.add_row(vec![
                Cell::new(&entry.id),
                Cell::new(&entry.exercise_name),
                Cell::new(&entry.category),
                Cell::new(side),
                Cell::new(&entry.value),
                Cell::new(count),
                Cell::new(if entry.notes.is_empty() { "-" } else { entry.notes.as_str() }),
            ]);
        }
        println!("{table}\n");
    }
}

fn print_groups_csv(groups: &[DayGroup]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    writer.write_record([
        "Date", "Status", "ID", "Exercise", "Category", "Side", "Value", "Sets", "Unit", "Notes",
    ])?;

    for group in groups {
        if group.entries.is_empty() {
            writer.write_record([
                group.date.to_string().as_str(),
                group.status.as_str(),
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
            ])?;
        }
        for entry in &group.entries {
            writer.write_record([
                group.date.to_string(),
                group.status.clone(),
                entry.id.clone(),
                entry.exercise_name.clone(),
                entry.category.clone(),
                entry.side.to_string(),
                entry.value.clone(),
                entry.sets.to_string(),
                entry.unit.clone(),
                entry.notes.clone(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn print_catalog_table(catalog: &Catalog, filter: Option<&str>, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").fg(header_color),
            Cell::new("ID").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Mode").fg(header_color),
            Cell::new("Unilateral").fg(header_color),
            Cell::new("Default").fg(header_color),
        ]);

    for (category, members) in catalog.grouped(filter) {
        for def in members {
            table.add_row(vec![
                Cell::new(category),
                Cell::new(&def.id),
                Cell::new(&def.name),
                Cell::new(def.mode.to_string()),
                Cell::new(if def.is_unilateral { "yes" } else { "no" }),
                Cell::new(
                    def.default_quantity
                        .map_or("-".to_string(), |q| format!("{q}{}", def.reps_unit())),
                ),
            ]);
        }
    }
    println!("{table}");
}

fn print_catalog_csv(catalog: &Catalog, filter: Option<&str>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["Category", "ID", "Name", "Mode", "Unilateral", "DefaultUnit", "DefaultQuantity"])?;

    for (category, members) in catalog.grouped(filter) {
        for def in members {
            writer.write_record([
                category.to_string(),
                def.id.clone(),
                def.name.clone(),
                def.mode.to_string(),
                def.is_unilateral.to_string(),
                def.default_unit.clone().unwrap_or_default(),
                def.default_quantity.map_or(String::new(), |q| q.to_string()),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
