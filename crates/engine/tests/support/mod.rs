#![forbid(unsafe_code)]
#![allow(dead_code)]

use jobtrack_core::{JobChanges, JobId, JobInput, JobRecord, JobStatus, NewJob, OwnerId};
use jobtrack_engine::{EngineConfig, JobLifecycleEngine};
use jobtrack_storage::{
    CacheError, JobStore, ListingCache, MemoryListingCache, PairLookup, SqliteStore, StoreError,
};
use std::cell::Cell;
use std::time::Duration;
use tempfile::TempDir;

/// Real store with write counters and a switch that makes every call fail as unreachable.
///
/// `stale_lookups` makes the next pair lookups miss, as if another writer committed between
/// the duplicate check and the write.
pub struct CountingStore {
    pub inner: SqliteStore,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
    pub owner_scans: Cell<usize>,
    pub offline: Cell<bool>,
    pub stale_lookups: Cell<usize>,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.get() {
            return Err(StoreError::Io(std::io::Error::other("connection refused")));
        }
        Ok(())
    }
}

impl JobStore for CountingStore {
    fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<JobRecord>, StoreError> {
        self.check_online()?;
        self.owner_scans.set(self.owner_scans.get() + 1);
        self.inner.find_by_owner(owner_id)
    }

    fn find_one(&self, lookup: PairLookup<'_>) -> Result<Option<JobRecord>, StoreError> {
        self.check_online()?;
        let stale = self.stale_lookups.get();
        if stale > 0 {
            self.stale_lookups.set(stale - 1);
            return Ok(None);
        }
        self.inner.find_one(lookup)
    }

    fn find_by_id(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        self.check_online()?;
        self.inner.find_by_id(id)
    }

    fn insert(&mut self, job: NewJob) -> Result<JobRecord, StoreError> {
        self.check_online()?;
        self.inserts += 1;
        self.inner.insert(job)
    }

    fn update_by_id(
        &mut self,
        id: &JobId,
        changes: &JobChanges,
    ) -> Result<Option<JobRecord>, StoreError> {
        self.check_online()?;
        self.updates += 1;
        self.inner.update_by_id(id, changes)
    }

    fn delete_by_id(&mut self, id: &JobId) -> Result<bool, StoreError> {
        self.check_online()?;
        self.deletes += 1;
        self.inner.delete_by_id(id)
    }
}

/// In-memory cache that records traffic and can be made to fail.
#[derive(Default)]
pub struct CountingCache {
    pub inner: MemoryListingCache,
    pub gets: Cell<usize>,
    pub sets: Cell<usize>,
    pub invalidations: Cell<usize>,
    pub failing: Cell<bool>,
}

impl CountingCache {
    fn check_online(&self) -> Result<(), CacheError> {
        if self.failing.get() {
            return Err(CacheError::Unavailable("cache connection lost".to_string()));
        }
        Ok(())
    }
}

impl ListingCache for CountingCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.gets.set(self.gets.get() + 1);
        self.check_online()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.sets.set(self.sets.get() + 1);
        self.check_online()?;
        self.inner.set(key, value, ttl)
    }

    fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        self.invalidations.set(self.invalidations.get() + 1);
        self.check_online()?;
        self.inner.invalidate(key)
    }
}

pub type TestEngine = JobLifecycleEngine<CountingStore, CountingCache>;

pub fn engine() -> (TempDir, TestEngine) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    let config = EngineConfig {
        invalidate_backoff: Duration::ZERO,
        ..EngineConfig::default()
    };
    let engine = JobLifecycleEngine::new(
        CountingStore {
            inner: store,
            inserts: 0,
            updates: 0,
            deletes: 0,
            owner_scans: Cell::new(0),
            offline: Cell::new(false),
            stale_lookups: Cell::new(0),
        },
        CountingCache::default(),
        config,
    );
    (dir, engine)
}

pub fn owner(id: &str) -> OwnerId {
    OwnerId::try_new(id).expect("owner id")
}

pub fn input(title: &str, company: &str, status: JobStatus) -> JobInput {
    JobInput {
        title: title.to_string(),
        company: company.to_string(),
        status,
        ..JobInput::default()
    }
}
