// src/lib.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

// --- Declare modules ---
pub mod catalog;
pub mod codec;
mod config;
pub mod db;
pub mod entry;
pub mod inputs;
pub mod model;
pub mod report;
pub mod sync_client;

// --- Expose public types ---
pub use catalog::{Catalog, CatalogRow, ExerciseDefinition, ExerciseMode};
pub use codec::{DecodedDay, HistoryRow};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme,
};
pub use db::{get_db_path as get_db_path_util, Error as DbError};
pub use entry::{EditSession, EditState, EntryDraft, Error as EntryError};
pub use inputs::{InputError, InputOverrides, ModeInputs};
pub use model::{DailyStatuses, DayGroup, LogEntry, Side};
pub use sync_client::{Error as SyncError, SyncClient};

/// Outcome of applying remote (or imported) history rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub days: usize,
    pub entries: usize,
    /// Segments that could not be decoded, prefixed with their date.
    pub dropped: Vec<String>,
    /// Rows whose date cell held no recognizable date.
    pub skipped_rows: usize,
}

/// What a form submission changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub entry: Option<LogEntry>,
    pub status_changed: bool,
}

/// The store object: owns the catalog, the log, the daily statuses and the
/// edit cursor, and persists every mutation.
pub struct AppService {
    pub config: Config,
    pub conn: Connection,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    catalog: Catalog,
    logs: Vec<LogEntry>,
    statuses: DailyStatuses,
    edit_state: EditState,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .context(format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Self::with_connection(config, conn, db_path, config_path)
    }

    /// Builds a service on an already opened connection, creating the schema
    /// and loading the scoped keys. Missing keys load as empty collections.
    /// # Errors
    /// Returns `anyhow::Error` if the schema cannot be created or a stored
    /// document cannot be decoded.
    pub fn with_connection(
        config: Config,
        conn: Connection,
        db_path: PathBuf,
        config_path: PathBuf,
    ) -> Result<Self> {
        db::init(&conn).context("Failed to initialize database schema")?;

        let scope = config.profile.clone();
        let definitions: Vec<ExerciseDefinition> =
            db::read_json(&conn, &db::scoped_key(&scope, db::CATALOG_KEY))
                .context("Failed to load cached catalog")?;
        let logs: Vec<LogEntry> = db::read_json(&conn, &db::scoped_key(&scope, db::LOGS_KEY))
            .context("Failed to load log entries")?;
        let statuses: DailyStatuses =
            db::read_json(&conn, &db::scoped_key(&scope, db::STATUSES_KEY))
                .context("Failed to load daily statuses")?;

        info!(
            "Loaded {} exercises, {} entries, {} statuses for profile '{}'",
            definitions.len(),
            logs.len(),
            statuses.len(),
            scope
        );

        Ok(Self {
            config,
            conn,
            db_path,
            config_path,
            catalog: Catalog::new(definitions),
            logs,
            statuses,
            edit_state: EditState::Idle,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    // --- Configuration ---

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// # Errors
    /// - `ConfigError::InvalidEndpoint` if the URL is not http(s).
    /// - `ConfigError` variants if saving fails.
    pub fn set_endpoint(&mut self, url: &str) -> Result<(), ConfigError> {
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(url.to_string()));
        }
        self.config.endpoint = Some(trimmed.to_string());
        self.save_config()
    }

    /// # Errors
    /// - `ConfigError::InvalidTimeout` if `secs` is 0.
    /// - `ConfigError` variants if saving fails.
    pub fn set_request_timeout(&mut self, secs: u64) -> Result<(), ConfigError> {
        if secs == 0 {
            return Err(ConfigError::InvalidTimeout(secs));
        }
        self.config.request_timeout_secs = secs;
        self.save_config()
    }

    /// # Errors
    /// - `ConfigError::InvalidColor` for unknown colour names.
    /// - `ConfigError` variants if saving fails.
    pub fn set_header_color(&mut self, color: &str) -> Result<(), ConfigError> {
        let parsed = parse_color(color)?;
        self.config.theme.header_color = format!("{parsed:?}");
        self.save_config()
    }

    /// Client for the configured endpoint.
    /// # Errors
    /// Returns an error if no endpoint is configured or the client cannot be built.
    pub fn sync_client(&self) -> Result<SyncClient> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| ConfigError::EndpointNotSet(self.config_path.clone()))?;
        Ok(SyncClient::new(endpoint, self.config.request_timeout())?)
    }

    // --- Catalog ---

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replaces the catalog and caches it locally.
    /// # Errors
    /// Returns `DbError` if the catalog cannot be written.
    pub fn set_catalog(&mut self, catalog: Catalog) -> Result<(), DbError> {
        db::write_json(&self.conn, &self.key(db::CATALOG_KEY), catalog.definitions())?;
        self.catalog = catalog;
        Ok(())
    }

    // --- Reading the log ---

    #[must_use]
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    #[must_use]
    pub const fn statuses(&self) -> &DailyStatuses {
        &self.statuses
    }

    #[must_use]
    pub fn status_for(&self, date: NaiveDate) -> &str {
        self.statuses.get(&date).map_or("", String::as_str)
    }

    #[must_use]
    pub fn find_entry(&self, id: &str) -> Option<&LogEntry> {
        self.logs.iter().find(|e| e.id == id)
    }

    /// All day-groups, newest first.
    #[must_use]
    pub fn day_groups(&self) -> Vec<DayGroup> {
        model::group_by_day(&self.logs, &self.statuses)
    }

    /// The group for one date, `None` if the date has neither entries nor a status.
    #[must_use]
    pub fn day_group(&self, date: NaiveDate) -> Option<DayGroup> {
        self.day_groups().into_iter().find(|g| g.date == date)
    }

    /// Every day-group as export lines.
    #[must_use]
    pub fn export_all(&self) -> String {
        codec::export_text(&self.day_groups())
    }

    #[must_use]
    pub fn export_day(&self, date: NaiveDate) -> Option<String> {
        self.day_group(date).map(|g| codec::encode_line(&g))
    }

    #[must_use]
    pub fn report_all(&self) -> String {
        report::render(&self.day_groups(), &self.catalog)
    }

    // --- Creating entries ---

    /// Blank form for the exercise named by `identifier` (id or name).
    /// # Errors
    /// - `EntryError::NoExerciseSelected` if the catalog is empty.
    /// - `EntryError::ExerciseNotFound` if the identifier does not resolve.
    pub fn new_draft(&self, identifier: &str, date: NaiveDate) -> Result<EntryDraft, EntryError> {
        let def = self.resolve_exercise(identifier)?;
        Ok(EntryDraft::new(def, date))
    }

    /// # Errors
    /// - `EntryError::NoExerciseSelected` if the catalog is empty.
    /// - `EntryError::ExerciseNotFound` if the identifier does not resolve.
    pub fn resolve_exercise(&self, identifier: &str) -> Result<&ExerciseDefinition, EntryError> {
        if self.catalog.is_empty() {
            return Err(EntryError::NoExerciseSelected);
        }
        self.catalog
            .resolve(identifier)
            .ok_or_else(|| EntryError::ExerciseNotFound(identifier.to_string()))
    }

    /// Validates the draft and appends a new entry with a fresh id.
    /// # Errors
    /// Validation errors from [`EntryDraft::build`] or a persistence failure.
    pub fn add_entry(&mut self, draft: &EntryDraft) -> Result<LogEntry, EntryError> {
        let entry = draft.build(&self.catalog, Uuid::new_v4().to_string())?;
        self.logs.push(entry.clone());
        if let Err(e) = self.persist_logs() {
            self.logs.pop();
            return Err(e.into());
        }
        info!("Added {} entry {} on {}", entry.exercise_name, entry.id, entry.date);
        Ok(entry)
    }

    /// One press of the save button: stores the status note for `date` (if
    /// given) and the draft (if given) in a single write.
    /// # Errors
    /// - `EntryError::NoExerciseSelected` if there is no draft and the status
    ///   would not change.
    /// - Validation errors from [`EntryDraft::build`].
    /// - `EntryError::Store` if the write fails; neither the log nor the status
    ///   is changed in that case.
    pub fn submit(
        &mut self,
        date: NaiveDate,
        draft: Option<&EntryDraft>,
        status: Option<&str>,
    ) -> Result<SubmitOutcome, EntryError> {
        let status = status.map(str::trim);
        let status_changed = status.is_some_and(|text| text != self.status_for(date));
        if draft.is_none() && !status_changed {
            return Err(EntryError::NoExerciseSelected);
        }
        let entry = draft
            .map(|d| d.build(&self.catalog, Uuid::new_v4().to_string()))
            .transpose()?;

        let previous_status = self.statuses.get(&date).cloned();
        if let Some(e) = &entry {
            self.logs.push(e.clone());
        }
        if let Some(text) = status.filter(|_| status_changed) {
            if text.is_empty() {
                self.statuses.remove(&date);
            } else {
                self.statuses.insert(date, text.to_string());
            }
        }

        if let Err(e) = self.persist_all() {
            if entry.is_some() {
                self.logs.pop();
            }
            match previous_status {
                Some(p) => self.statuses.insert(date, p),
                None => self.statuses.remove(&date),
            };
            return Err(e.into());
        }
        if let Some(e) = &entry {
            info!("Added {} entry {} on {}", e.exercise_name, e.id, e.date);
        }
        Ok(SubmitOutcome {
            entry,
            status_changed,
        })
    }

    /// Sets (or with blank text, clears) the status note for `date`. Returns
    /// whether anything changed.
    /// # Errors
    /// Returns `DbError` if the statuses cannot be written.
    pub fn set_status(&mut self, date: NaiveDate, text: &str) -> Result<bool, DbError> {
        let text = text.trim();
        let previous = if text.is_empty() {
            self.statuses.remove(&date)
        } else {
            self.statuses.insert(date, text.to_string())
        };
        if previous.as_deref() == Some(text) || (previous.is_none() && text.is_empty()) {
            return Ok(false);
        }
        if let Err(e) = self.persist_statuses() {
            match previous {
                Some(p) => self.statuses.insert(date, p),
                None => self.statuses.remove(&date),
            };
            return Err(e);
        }
        Ok(true)
    }

    // --- Editing ---

    #[must_use]
    pub const fn edit_state(&self) -> &EditState {
        &self.edit_state
    }

    /// Puts entry `id` under the edit cursor, replacing any edit in progress.
    /// # Errors
    /// - `EntryError::EntryNotFound` if no entry has that id.
    /// - `EntryError::ExerciseNotFound` if the entry's exercise name is no longer in the catalog.
    pub fn begin_edit(&mut self, id: &str) -> Result<EntryDraft, EntryError> {
        let entry = self
            .find_entry(id)
            .ok_or_else(|| EntryError::EntryNotFound(id.to_string()))?;
        let draft = EntryDraft::from_entry(&self.catalog, entry)?;

        if let EditState::Editing(previous) = &self.edit_state {
            if previous.entry_id != id {
                info!("Discarding unsaved edit of entry {}", previous.entry_id);
            }
        }
        self.edit_state = EditState::Editing(EditSession {
            entry_id: id.to_string(),
            draft: draft.clone(),
        });
        Ok(draft)
    }

    /// Validates `draft`, re-encodes it onto the entry under the cursor
    /// (keeping its id) and returns to idle. On error the cursor stays put.
    /// # Errors
    /// - `EntryError::NotEditing` if no edit is in progress.
    /// - `EntryError::EntryNotFound` if the entry was deleted meanwhile.
    /// - Validation or persistence errors.
    pub fn save_edit(&mut self, draft: &EntryDraft) -> Result<LogEntry, EntryError> {
        let entry_id = match &self.edit_state {
            EditState::Editing(session) => session.entry_id.clone(),
            EditState::Idle => return Err(EntryError::NotEditing),
        };
        let position = self
            .logs
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| EntryError::EntryNotFound(entry_id.clone()))?;

        let updated = draft.build(&self.catalog, entry_id)?;
        let previous = std::mem::replace(&mut self.logs[position], updated.clone());
        if let Err(e) = self.persist_logs() {
            self.logs[position] = previous;
            return Err(e.into());
        }
        self.edit_state = EditState::Idle;
        info!("Updated entry {}", updated.id);
        Ok(updated)
    }

    pub fn cancel_edit(&mut self) {
        self.edit_state = EditState::Idle;
    }

    // --- Deleting ---

    /// # Errors
    /// - `EntryError::EntryNotFound` if no entry has that id.
    /// - `EntryError::Store` if the log cannot be written.
    pub fn delete_entry(&mut self, id: &str) -> Result<LogEntry, EntryError> {
        let position = self
            .logs
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EntryError::EntryNotFound(id.to_string()))?;
        let removed = self.logs.remove(position);
        if let Err(e) = self.persist_logs() {
            self.logs.insert(position, removed);
            return Err(e.into());
        }
        self.drop_cursor_if(|entry_id| entry_id == id);
        Ok(removed)
    }

    /// Removes every entry and the status of `date`. Returns the number of
    /// entries removed.
    /// # Errors
    /// Returns `DbError` if the store cannot be written.
    pub fn delete_day(&mut self, date: NaiveDate) -> Result<usize, DbError> {
        let saved_logs = self.logs.clone();
        let removed: Vec<String> = self
            .logs
            .iter()
            .filter(|e| e.date == date)
            .map(|e| e.id.clone())
            .collect();
        self.logs.retain(|e| e.date != date);
        let previous_status = self.statuses.remove(&date);

        if let Err(e) = self.persist_all() {
            self.logs = saved_logs;
            if let Some(p) = previous_status {
                self.statuses.insert(date, p);
            }
            return Err(e);
        }
        self.drop_cursor_if(|entry_id| removed.iter().any(|id| id == entry_id));
        Ok(removed.len())
    }

    /// Wipes the whole log and every status. The catalog cache is kept.
    /// # Errors
    /// Returns `DbError` if the keys cannot be removed; nothing is removed then.
    pub fn clear_all(&mut self) -> Result<(), DbError> {
        let tx = self.conn.unchecked_transaction()?;
        db::delete_key(&tx, &self.key(db::LOGS_KEY))?;
        db::delete_key(&tx, &self.key(db::STATUSES_KEY))?;
        tx.commit()?;

        self.logs.clear();
        self.statuses.clear();
        self.edit_state = EditState::Idle;
        Ok(())
    }

    // --- Restore ---

    /// Decodes history rows and replaces the matching local days with them.
    /// Days not present in `rows` are left alone.
    /// # Errors
    /// Returns `DbError` if the store cannot be written; in-memory state is
    /// rolled back in that case.
    pub fn restore_history(&mut self, rows: &[HistoryRow]) -> Result<RestoreSummary, DbError> {
        let mut summary = RestoreSummary::default();
        let mut decoded_days = Vec::new();
        for row in rows {
            let Some(date) = row.day() else {
                warn!("Skipping history row with unrecognized date '{}'", row.date);
                summary.skipped_rows += 1;
                continue;
            };
            decoded_days.push(codec::decode_content(date, &row.content, &self.catalog));
        }
        self.apply_decoded(decoded_days, summary)
    }

    /// Restores from an exported text blob (`<date>,"<content>"` per line).
    /// # Errors
    /// Returns an error if the text is not valid CSV or the store cannot be written.
    pub fn import_export_text(&mut self, text: &str) -> Result<RestoreSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to parse exported text")?;
            let date = record.get(0).unwrap_or_default().trim();
            if date.is_empty() {
                continue;
            }
            // Unquoted content may itself contain commas.
            let content = record.iter().skip(1).collect::<Vec<_>>().join(",");
            rows.push(HistoryRow {
                date: date.to_string(),
                content,
            });
        }
        Ok(self.restore_history(&rows)?)
    }

    fn apply_decoded(
        &mut self,
        days: Vec<DecodedDay>,
        mut summary: RestoreSummary,
    ) -> Result<RestoreSummary, DbError> {
        let saved_logs = self.logs.clone();
        let saved_statuses = self.statuses.clone();

        for day in days {
            summary.days += 1;
            summary.entries += day.entries.len();
            summary
                .dropped
                .extend(day.dropped.iter().map(|s| format!("{}: {s}", day.date)));

            self.logs.retain(|e| e.date != day.date);
            self.logs.extend(day.entries);
            if day.status.trim().is_empty() {
                self.statuses.remove(&day.date);
            } else {
                self.statuses.insert(day.date, day.status);
            }
        }

        if let Err(e) = self.persist_all() {
            self.logs = saved_logs;
            self.statuses = saved_statuses;
            return Err(e);
        }
        self.edit_state = EditState::Idle;
        info!(
            "Restored {} days with {} entries ({} segments dropped)",
            summary.days,
            summary.entries,
            summary.dropped.len()
        );
        Ok(summary)
    }

    // --- Remote ---

    /// Fetches the catalog and replaces the local one. The local catalog is
    /// untouched when the fetch fails.
    /// # Errors
    /// Network or persistence failure.
    pub async fn refresh_catalog(&mut self, client: &SyncClient) -> Result<usize> {
        let rows = client
            .fetch_catalog()
            .await
            .context("Failed to fetch exercise catalog")?;
        let catalog = Catalog::from_rows(rows);
        let count = catalog.len();
        self.set_catalog(catalog)
            .context("Failed to cache exercise catalog")?;
        Ok(count)
    }

    /// Uploads one day. Returns the endpoint's acknowledgement text.
    /// # Errors
    /// Fails if the day is empty, on network failure, or if the endpoint rejects the write.
    pub async fn push_day(&self, client: &SyncClient, date: NaiveDate) -> Result<String> {
        let group = self
            .day_group(date)
            .with_context(|| format!("Nothing recorded on {date}"))?;
        let row = HistoryRow::new(date, codec::encode_content(&group.status, &group.entries));
        client
            .push_day(&row)
            .await
            .with_context(|| format!("Failed to upload {date}"))
    }

    /// Downloads the remote history and restores it locally.
    /// # Errors
    /// Network or persistence failure; local state is untouched on either.
    pub async fn restore_from_remote(&mut self, client: &SyncClient) -> Result<RestoreSummary> {
        let rows = client
            .fetch_history()
            .await
            .context("Failed to fetch history")?;
        Ok(self.restore_history(&rows)?)
    }

    // --- Internals ---

    fn key(&self, name: &str) -> String {
        db::scoped_key(&self.config.profile, name)
    }

    fn persist_logs(&self) -> Result<(), DbError> {
        db::write_json(&self.conn, &self.key(db::LOGS_KEY), &self.logs)
    }

    fn persist_statuses(&self) -> Result<(), DbError> {
        db::write_json(&self.conn, &self.key(db::STATUSES_KEY), &self.statuses)
    }

    /// Writes logs and statuses in one transaction.
    fn persist_all(&self) -> Result<(), DbError> {
        let tx = self.conn.unchecked_transaction()?;
        db::write_json(&tx, &self.key(db::LOGS_KEY), &self.logs)?;
        db::write_json(&tx, &self.key(db::STATUSES_KEY), &self.statuses)?;
        tx.commit()?;
        Ok(())
    }

    fn drop_cursor_if(&mut self, matches: impl Fn(&str) -> bool) {
        if let EditState::Editing(session) = &self.edit_state {
            if matches(&session.entry_id) {
                self.edit_state = EditState::Idle;
            }
        }
    }
}
