//! SQLite persistence.
//!
//! One database file holds every table. Callers open a fresh [`Store`] per
//! unit of work and drop it when done; concurrent writers race and the last
//! write wins.

use crate::error::{HarvestError, Result};
use crate::io;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    room        TEXT NOT NULL,
    plants      INTEGER NOT NULL,
    strain      TEXT NOT NULL,
    flower_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workers (
    name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS room_workers (
    room   TEXT PRIMARY KEY,
    worker TEXT NOT NULL REFERENCES workers(name)
);

CREATE TABLE IF NOT EXISTS worker_actions (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    ts      TEXT NOT NULL DEFAULT (datetime('now')),
    worker  TEXT NOT NULL DEFAULT '',
    action  TEXT NOT NULL DEFAULT '',
    room    TEXT NOT NULL DEFAULT '',
    details TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS tasks (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    title    TEXT NOT NULL,
    assignee TEXT,
    due_date TEXT,
    status   TEXT NOT NULL DEFAULT 'pending'
);

CREATE TABLE IF NOT EXISTS daily_log (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    room TEXT NOT NULL,
    kind TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_records_room ON records(room);
CREATE INDEX IF NOT EXISTS idx_worker_actions_worker ON worker_actions(worker);
CREATE INDEX IF NOT EXISTS idx_daily_log_date ON daily_log(date);
";

/// Every SQLite file starts with this 16-byte header.
const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                io::ensure_dir(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Schema and row-count snapshot for troubleshooting a deployment.
    pub fn diag(&self) -> Result<Diagnostics> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare("PRAGMA table_info(records)")?;
        let records_columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    kind: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let records_count = self.count("records")?;
        let workers_count = self.count("workers")?;
        let tasks_count = self.count("tasks")?;

        Ok(Diagnostics {
            tables,
            records_columns,
            records_count,
            workers_count,
            tasks_count,
        })
    }

    fn count(&self, table: &str) -> Result<i64> {
        // Table names come from a fixed set above, never from user input.
        let n = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .optional()?;
        Ok(n.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub tables: Vec<String>,
    pub records_columns: Vec<ColumnInfo>,
    pub records_count: i64,
    pub workers_count: i64,
    pub tasks_count: i64,
}

// ---------------------------------------------------------------------------
// Raw file backup / restore
// ---------------------------------------------------------------------------

/// Read the whole database file for download.
pub fn read_db_bytes(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Replace the database file with an uploaded copy.
///
/// The upload is staged next to `path` and must pass the SQLite header check,
/// `PRAGMA quick_check` and our schema before it is swapped in. A rejected
/// upload leaves the live file untouched; open readers keep seeing the old
/// file until they reopen.
pub fn replace_db(path: &Path, bytes: &[u8]) -> Result<()> {
    if bytes.len() < SQLITE_MAGIC.len() || &bytes[..SQLITE_MAGIC.len()] != SQLITE_MAGIC {
        return Err(HarvestError::InvalidDatabase(format!(
            "upload of {} bytes has no SQLite header",
            bytes.len()
        )));
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    io::ensure_dir(dir)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    check_upload(staged.path())?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn check_upload(path: &Path) -> Result<()> {
    let invalid = |e: rusqlite::Error| HarvestError::InvalidDatabase(e.to_string());
    let conn = Connection::open(path).map_err(invalid)?;
    let verdict: String = conn
        .query_row("PRAGMA quick_check", [], |row| row.get(0))
        .map_err(invalid)?;
    if verdict != "ok" {
        return Err(HarvestError::InvalidDatabase(format!(
            "integrity check failed: {verdict}"
        )));
    }
    conn.execute_batch(SCHEMA).map_err(invalid)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_file_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/harvest.db");
        let store = Store::open(&path).unwrap();
        assert!(path.exists());
        let diag = store.diag().unwrap();
        for t in ["records", "workers", "room_workers", "worker_actions", "tasks", "daily_log"] {
            assert!(diag.tables.iter().any(|n| n == t), "missing table {t}");
        }
        assert_eq!(diag.records_count, 0);
    }

    #[test]
    fn open_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harvest.db");
        drop(Store::open(&path).unwrap());
        let store = Store::open(&path).unwrap();
        assert_eq!(store.diag().unwrap().records_count, 0);
    }

    #[test]
    fn diag_lists_record_columns() {
        let store = Store::open_in_memory().unwrap();
        let names: Vec<String> = store
            .diag()
            .unwrap()
            .records_columns
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["id", "room", "plants", "strain", "flower_date"]);
    }

    #[test]
    fn replace_db_rejects_non_sqlite_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harvest.db");
        let err = replace_db(&path, b"definitely not a database").unwrap_err();
        assert!(matches!(err, HarvestError::InvalidDatabase(_)));
        assert!(!path.exists());
    }

    #[test]
    fn replace_db_round_trips_a_real_file() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.db");
        {
            let store = Store::open(&src).unwrap();
            store
                .conn()
                .execute("INSERT INTO workers(name) VALUES ('Mei')", [])
                .unwrap();
        }
        let bytes = read_db_bytes(&src).unwrap();
        let dst = dir.path().join("dst.db");
        replace_db(&dst, &bytes).unwrap();
        let store = Store::open(&dst).unwrap();
        assert_eq!(store.diag().unwrap().workers_count, 1);
    }

    #[test]
    fn rejected_upload_leaves_live_database_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harvest.db");
        {
            let store = Store::open(&path).unwrap();
            store
                .conn()
                .execute("INSERT INTO workers(name) VALUES ('Mei')", [])
                .unwrap();
        }
        let before = read_db_bytes(&path).unwrap();

        let mut corrupt = SQLITE_MAGIC.to_vec();
        corrupt.extend(std::iter::repeat(0xAA).take(200));
        let err = replace_db(&path, &corrupt).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidDatabase(_)));
        // the staged copy is cleaned up
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        assert_eq!(read_db_bytes(&path).unwrap(), before);
        let store = Store::open(&path).unwrap();
        assert_eq!(store.diag().unwrap().workers_count, 1);
    }
}
