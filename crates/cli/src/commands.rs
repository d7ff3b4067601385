#![forbid(unsafe_code)]

use crate::config::{CacheBackend, Command};
use crate::output::{self, CliError};
use crate::validate;
use jobtrack_core::{JobId, JobInput, JobPatch, OwnerId};
use jobtrack_engine::JobLifecycleEngine;
use jobtrack_storage::{
    CacheError, JobStore, ListingCache, MemoryListingCache, NoopListingCache, SqliteListingCache,
};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Listing cache selected at startup.
pub(crate) enum CacheHandle {
    Sqlite(SqliteListingCache),
    Memory(MemoryListingCache),
    Off(NoopListingCache),
}

impl CacheHandle {
    pub(crate) fn open(backend: CacheBackend, data_dir: &Path) -> Result<Self, CacheError> {
        Ok(match backend {
            CacheBackend::Sqlite => Self::Sqlite(SqliteListingCache::open(data_dir)?),
            CacheBackend::Memory => Self::Memory(MemoryListingCache::new()),
            CacheBackend::Off => Self::Off(NoopListingCache),
        })
    }

    pub(crate) fn close(self) -> Result<(), CacheError> {
        match self {
            Self::Sqlite(cache) => cache.close(),
            Self::Memory(_) | Self::Off(_) => Ok(()),
        }
    }

    fn backend(&self) -> &dyn ListingCache {
        match self {
            Self::Sqlite(cache) => cache,
            Self::Memory(cache) => cache,
            Self::Off(cache) => cache,
        }
    }
}

impl ListingCache for CacheHandle {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.backend().get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.backend().set(key, value, ttl)
    }

    fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        self.backend().invalidate(key)
    }
}

/// Command with its arguments already shape-checked.
#[derive(Debug)]
pub(crate) enum Request {
    List,
    Add(JobInput),
    Edit(JobId, JobPatch),
    Remove(JobId),
}

impl Request {
    pub(crate) fn parse(command: Command) -> Result<Self, CliError> {
        Ok(match command {
            Command::List => Self::List,
            Command::Add(args) => Self::Add(validate::new_job(args)?),
            Command::Edit(args) => {
                let (job_id, patch) = validate::patch(args)?;
                Self::Edit(job_id, patch)
            }
            Command::Remove { job_id } => Self::Remove(validate::job_id(&job_id)?),
        })
    }
}

pub(crate) fn execute<S: JobStore, C: ListingCache>(
    engine: &mut JobLifecycleEngine<S, C>,
    owner_id: &OwnerId,
    request: Request,
) -> Result<Value, CliError> {
    match request {
        Request::List => output::jobs(&engine.get_jobs(owner_id)?),
        Request::Add(input) => output::job(&engine.create_job(owner_id, input)?),
        Request::Edit(job_id, patch) => {
            output::updated(&engine.update_job(owner_id, &job_id, patch)?)
        }
        Request::Remove(job_id) => {
            engine.delete_job(owner_id, &job_id)?;
            Ok(output::deleted(&job_id))
        }
    }
}
