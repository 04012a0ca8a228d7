use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Key under which the certificate working-directory snapshot lives. The job
/// reads and rewrites exactly this one entry.
pub const SNAPSHOT_KEY: &str = "folder.tgz";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e.to_string())
    }
}

/// Minimal shared-store seam: fetch a named blob, or overwrite it.
///
/// The trait stays keyed so tests can exercise absent entries and substitute
/// backends; the job itself only ever touches [`SNAPSHOT_KEY`].
pub trait SnapshotStore {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn store(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

/// SQLite-backed snapshot store.
///
/// Ephemeral workers share one database; writes are whole-blob upserts and
/// the last writer wins, which matches the job's external-scheduling
/// contract. A connection is opened per call; the job makes at most two.
pub struct SqliteSnapshotStore {
    path: PathBuf,
}

impl SqliteSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Accepts either a plain filesystem path or a `sqlite://` connection
    /// string, since deployments configure the store through a generic
    /// database URI variable.
    pub fn from_uri(uri: &str) -> Self {
        Self::new(database_path(uri))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             CREATE TABLE IF NOT EXISTS job_cache (
                file_name TEXT PRIMARY KEY,
                data BLOB NOT NULL
             );",
        )?;
        Ok(conn)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let conn = self.open()?;
        let blob = conn
            .query_row(
                "SELECT data FROM job_cache WHERE file_name = ?1;",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn store(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO job_cache (file_name, data) VALUES (?1, ?2)
             ON CONFLICT(file_name) DO UPDATE SET data = excluded.data;",
            params![key, data],
        )?;
        Ok(())
    }
}

fn database_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("sqlite://").unwrap_or(uri))
}
