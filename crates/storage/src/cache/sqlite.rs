#![forbid(unsafe_code)]

use super::{CacheError, ListingCache};
use crate::store::now_ms;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::time::Duration;

const CACHE_FILE_NAME: &str = "listing_cache.db";

/// Listing cache kept in its own SQLite file, shared by every process pointed at the same
/// directory. Expired rows read as misses and are swept on the next `set`.
#[derive(Debug)]
pub struct SqliteListingCache {
    conn: Connection,
}

impl SqliteListingCache {
    pub fn open(cache_dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.as_ref();
        std::fs::create_dir_all(cache_dir)?;

        let conn = Connection::open(cache_dir.join(CACHE_FILE_NAME))?;
        conn.busy_timeout(Duration::from_secs(2))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS listing_cache (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              expires_at_ms INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(Self { conn })
    }

    pub fn close(self) -> Result<(), CacheError> {
        self.conn.close().map_err(|(_, err)| CacheError::from(err))
    }
}

impl ListingCache for SqliteListingCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM listing_cache WHERE key=?1 AND expires_at_ms > ?2",
                params![key, now_ms()],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now_ms = now_ms();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at_ms = now_ms.saturating_add(ttl_ms);

        self.conn.execute(
            "DELETE FROM listing_cache WHERE expires_at_ms <= ?1",
            params![now_ms],
        )?;
        self.conn.execute(
            r#"
            INSERT INTO listing_cache(key, value, expires_at_ms)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
              value=excluded.value,
              expires_at_ms=excluded.expires_at_ms
            "#,
            params![key, value, expires_at_ms],
        )?;
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let deleted = self
            .conn
            .execute("DELETE FROM listing_cache WHERE key=?1", params![key])?;
        Ok(deleted > 0)
    }
}
