#![forbid(unsafe_code)]

mod error;
mod jobs;
mod schema;

pub use error::StoreError;
pub use jobs::{PairLookup, PairMatch};

pub(crate) use error::{is_connectivity_failure, is_constraint_violation};

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

const DB_FILE_NAME: &str = "jobtrack.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed [`crate::JobStore`].
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        schema::preflight_gate(&conn)?;
        schema::install_schema(&conn, now_ms())?;
        tracing::debug!(path = %db_path.display(), "job store opened");

        Ok(Self { conn })
    }

    /// Releases the connection, surfacing any error SQLite reports while closing.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::from(err))
    }
}

pub(crate) fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
