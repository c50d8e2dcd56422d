// src/db.rs
//! Local key-value persistence.
//!
//! Each logical key holds one JSON document and is always rewritten in full.
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const LOGS_KEY: &str = "logs";
pub const STATUSES_KEY: &str = "statuses";
pub const CATALOG_KEY: &str = "catalog";

const DB_FILE_NAME: &str = "rehab_log.sqlite";
const APP_DATA_DIR: &str = "rehab-log";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed: {0}")]
    WriteFailed(rusqlite::Error),
    #[error("Stored value for '{key}' is not valid JSON: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Creates the key-value table if it doesn't exist.
pub fn init(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL -- one JSON document per key
        )",
        [],
    )
    .map_err(Error::Connection)?;
    Ok(())
}

/// Key of `name` inside a user scope, e.g. `default/logs`.
#[must_use]
pub fn scoped_key(scope: &str, name: &str) -> String {
    format!("{scope}/{name}")
}

/// Reads and deserializes the document stored under `key`. A missing key
/// yields `T::default()`.
pub fn read_json<T: DeserializeOwned + Default>(conn: &Connection, key: &str) -> Result<T, Error> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::QueryFailed)?;

    match raw {
        Some(text) => serde_json::from_str(&text).map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        }),
        None => {
            debug!(key, "Key not present, using empty default");
            Ok(T::default())
        }
    }
}

/// Replaces the document stored under `key`.
pub fn write_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<(), Error> {
    let text = serde_json::to_string(value).map_err(|source| Error::Encode {
        key: key.to_string(),
        source,
    })?;
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, text],
    )
    .map_err(Error::WriteFailed)?;
    debug!(key, bytes = text.len(), "Wrote key");
    Ok(())
}

/// Removes `key` entirely.
pub fn delete_key(conn: &Connection, key: &str) -> Result<(), Error> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
        .map_err(Error::WriteFailed)?;
    Ok(())
}
