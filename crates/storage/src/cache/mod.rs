#![forbid(unsafe_code)]

//! Key/value store for serialized per-owner listings.
//!
//! Entries are derived data: they carry a TTL, may vanish at any time, and the lifecycle
//! engine drops them on every mutation of the owner's records.

mod memory;
mod sqlite;

pub use memory::MemoryListingCache;
pub use sqlite::SqliteListingCache;

use jobtrack_core::OwnerId;
use std::time::Duration;

const LISTING_KEY_PREFIX: &str = "listing:";

pub fn listing_key(owner_id: &OwnerId) -> String {
    format!("{LISTING_KEY_PREFIX}{owner_id}")
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache backend: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        if crate::store::is_connectivity_failure(&value) {
            Self::Unavailable(value.to_string())
        } else {
            Self::Backend(value.to_string())
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(value: std::io::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

pub trait ListingCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for at most `ttl`, replacing any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drops the entry. `Ok(false)` when nothing was stored, which is not an error.
    fn invalidate(&self, key: &str) -> Result<bool, CacheError>;
}

/// Cache that never holds anything; every read goes to the store.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListingCache;

impl ListingCache for NoopListingCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn invalidate(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}
