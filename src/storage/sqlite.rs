use super::KeyValueStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::info;

/// Offset added to the schema version stored in `PRAGMA user_version`, so that
/// a database created by an unrelated tool (version 0) is never mistaken for
/// one of ours.
const BASE_DB_VERSION: usize = 99999;

const KV_TABLE_NAME: &str = "kv_entry";

/// Version of the `kv_entry` layout, stored as `BASE_DB_VERSION + SCHEMA_VERSION`.
const SCHEMA_VERSION: usize = 0;

const CREATE_KV_TABLE: &str = "CREATE TABLE kv_entry (key TEXT PRIMARY KEY NOT NULL, \
                               value TEXT NOT NULL, \
                               updated INTEGER DEFAULT (cast(strftime('%s','now') as int)))";

const KV_COLUMNS: &[&str] = &["key", "value", "updated"];

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_KV_TABLE, [])?;
    conn.execute(
        &format!("PRAGMA user_version = {}", BASE_DB_VERSION + SCHEMA_VERSION),
        [],
    )?;
    Ok(())
}

fn validate_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", KV_TABLE_NAME))?;
    let actual_columns = stmt
        .query_map(params![], |row| row.get::<usize, String>(1))?
        .collect::<Result<Vec<String>, rusqlite::Error>>()?;

    if actual_columns != KV_COLUMNS {
        bail!(
            "Table {} has columns [{}], expected [{}]",
            KV_TABLE_NAME,
            actual_columns.join(", "),
            KV_COLUMNS.join(", ")
        );
    }
    Ok(())
}

/// Substrate backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open {:?}", db_path))?
        } else {
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create {:?}", db_path))?;
            create_schema(&conn)?;
            conn
        };
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        if db_version as usize != SCHEMA_VERSION {
            bail!(
                "Database version {} is not supported, expected {}",
                db_version,
                SCHEMA_VERSION
            );
        }
        validate_schema(&conn)?;
        info!("Opened accounts database");

        Ok(SqliteKeyValueStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT value FROM kv_entry WHERE key = ?1",
                params![key],
                |row| row.get::<usize, String>(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key {}", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO kv_entry (key, value) VALUES (?1, ?2) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                 updated = cast(strftime('%s','now') as int)",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM kv_entry WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to delete key {}", key))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key FROM kv_entry ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<usize, String>(0))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()?;
        Ok(keys)
    }
}
