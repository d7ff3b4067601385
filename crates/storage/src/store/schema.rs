#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(super) const SCHEMA_VERSION: i64 = 1;

pub(super) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() || !tables.contains("store_state") {
        return Ok(());
    }

    let stored = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match stored {
        Some(stored) if stored != SCHEMA_VERSION => Err(StoreError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            stored,
        }),
        _ => Ok(()),
    }
}

pub(super) fn install_schema(conn: &Connection, now_ms: i64) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS jobs (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          id TEXT NOT NULL UNIQUE,
          owner_id TEXT NOT NULL,
          title TEXT NOT NULL,
          company TEXT NOT NULL,
          title_key TEXT NOT NULL,
          company_key TEXT NOT NULL,
          status TEXT NOT NULL
            CHECK(status IN ('Wishlist', 'Applied', 'Interviewing', 'Offer', 'Rejected')),
          salary TEXT,
          notes TEXT,
          link TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_owner_updated
          ON jobs(owner_id, updated_at_ms DESC, created_at_ms DESC);

        CREATE INDEX IF NOT EXISTS idx_jobs_owner_pair
          ON jobs(owner_id, title_key, company_key, created_at_ms DESC);

        CREATE UNIQUE INDEX IF NOT EXISTS idx_jobs_active_pair
          ON jobs(owner_id, title_key, company_key)
          WHERE status <> 'Rejected';
        "#,
    )?;

    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}
