#![forbid(unsafe_code)]

use crate::detector::{DuplicateCheck, DuplicateDetector};
use crate::listing::{decode_listing, dedupe_by_pair, encode_listing};
use crate::{EngineConfig, EngineError};
use jobtrack_core::{JobId, JobInput, JobPatch, JobRecord, OwnerId, PairKey};
use jobtrack_storage::{JobStore, ListingCache, StoreError, listing_key};

/// Result of an accepted update request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(JobRecord),
    /// Every supplied field already matched; nothing was written and the cache was left alone.
    Unchanged(JobRecord),
}

impl UpdateOutcome {
    pub fn job(&self) -> &JobRecord {
        match self {
            Self::Updated(job) | Self::Unchanged(job) => job,
        }
    }

    pub fn into_job(self) -> JobRecord {
        match self {
            Self::Updated(job) | Self::Unchanged(job) => job,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Unchanged(_))
    }
}

/// Create/read/update/delete over job records with duplicate and lifecycle rules, fronted by a
/// read-through listing cache.
///
/// Store and cache clients are injected at construction and handed back by
/// [`JobLifecycleEngine::into_parts`] so the owner can close them.
///
/// Every successful mutation drops `listing:<owner>` after the store write has committed; the
/// cached snapshot is never patched in place.
pub struct JobLifecycleEngine<S, C> {
    store: S,
    cache: C,
    config: EngineConfig,
}

impl<S: JobStore, C: ListingCache> JobLifecycleEngine<S, C> {
    pub fn new(store: S, cache: C, config: EngineConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_parts(self) -> (S, C) {
        (self.store, self.cache)
    }

    /// Deduplicated listing of the owner's jobs, served from the cache when possible.
    pub fn get_jobs(&self, owner_id: &OwnerId) -> Result<Vec<JobRecord>, EngineError> {
        let key = listing_key(owner_id);

        match self.cache.get(&key) {
            Ok(Some(payload)) => match decode_listing(&payload) {
                Ok(jobs) if !jobs.is_empty() => {
                    tracing::debug!(owner_id = %owner_id, count = jobs.len(), "listing cache hit");
                    return Ok(jobs);
                }
                Ok(_) => {
                    tracing::warn!(owner_id = %owner_id, "cached listing is empty; reloading");
                }
                Err(err) => {
                    tracing::warn!(
                        owner_id = %owner_id,
                        error = %err,
                        "cached listing unreadable; reloading"
                    );
                }
            },
            Ok(None) => {
                tracing::debug!(owner_id = %owner_id, "listing cache miss");
            }
            Err(err) => {
                tracing::warn!(
                    owner_id = %owner_id,
                    error = %err,
                    "listing cache read failed; reading store"
                );
            }
        }

        let jobs = dedupe_by_pair(self.store.find_by_owner(owner_id)?);
        if jobs.is_empty() {
            return Err(EngineError::NoJobsFound);
        }

        match encode_listing(&jobs) {
            Ok(payload) => {
                if let Err(err) = self.cache.set(&key, &payload, self.config.listing_ttl) {
                    tracing::warn!(
                        owner_id = %owner_id,
                        error = %err,
                        "listing cache populate failed"
                    );
                } else {
                    tracing::debug!(
                        owner_id = %owner_id,
                        count = jobs.len(),
                        "listing cache populated"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(owner_id = %owner_id, error = %err, "listing encode failed");
            }
        }

        Ok(jobs)
    }

    pub fn create_job(
        &mut self,
        owner_id: &OwnerId,
        input: JobInput,
    ) -> Result<JobRecord, EngineError> {
        let detector = DuplicateDetector::new(&self.store);
        let check = detector.check(owner_id, &input.title, &input.company, None)?;
        if let DuplicateCheck::AfterRejection { rejected } = &check {
            tracing::debug!(
                owner_id = %owner_id,
                rejected = %rejected,
                "opening a new round after rejection"
            );
        }

        let title = input.title.clone();
        let company = input.company.clone();
        let job = match self.store.insert(input.into_new_job(owner_id.clone())) {
            Ok(job) => job,
            Err(StoreError::ActivePairTaken) => {
                return Err(DuplicateDetector::new(&self.store)
                    .explain_conflict(owner_id, &title, &company, None));
            }
            Err(err) => return Err(err.into()),
        };

        self.invalidate_listing(owner_id)?;
        tracing::info!(owner_id = %owner_id, job_id = %job.id, status = %job.status, "job created");
        Ok(job)
    }

    pub fn update_job(
        &mut self,
        owner_id: &OwnerId,
        job_id: &JobId,
        patch: JobPatch,
    ) -> Result<UpdateOutcome, EngineError> {
        let current = self.load_owned(owner_id, job_id)?;

        if patch.is_empty() {
            return Err(EngineError::EmptyUpdate);
        }

        if let Some(requested) = patch.status
            && requested != current.status
        {
            current.status.check_transition(requested)?;
        }

        let title = patch.title.as_deref().unwrap_or(&current.title);
        let company = patch.company.as_deref().unwrap_or(&current.company);
        // Runs whatever the resulting status: a record moved onto a pair must not become the
        // latest match while an active record holds it.
        let supplies_pair = patch.title.is_some() && patch.company.is_some();
        let pair_changes = PairKey::new(title, company) != current.pair_key();
        if supplies_pair || pair_changes {
            DuplicateDetector::new(&self.store).check(owner_id, title, company, Some(job_id))?;
        }

        let changes = patch.diff(&current);
        if changes.is_empty() {
            tracing::debug!(owner_id = %owner_id, job_id = %job_id, "update is a no-op");
            return Ok(UpdateOutcome::Unchanged(current));
        }

        let updated = match self.store.update_by_id(job_id, &changes) {
            Ok(Some(job)) => job,
            Ok(None) => {
                return Err(EngineError::JobNotFound {
                    job_id: job_id.clone(),
                });
            }
            Err(StoreError::ActivePairTaken) => {
                let title = changes.title.as_deref().unwrap_or(&current.title);
                let company = changes.company.as_deref().unwrap_or(&current.company);
                return Err(DuplicateDetector::new(&self.store).explain_conflict(
                    owner_id,
                    title,
                    company,
                    Some(job_id),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        self.invalidate_listing(owner_id)?;
        tracing::info!(
            owner_id = %owner_id,
            job_id = %job_id,
            status = %updated.status,
            "job updated"
        );
        Ok(UpdateOutcome::Updated(updated))
    }

    pub fn delete_job(&mut self, owner_id: &OwnerId, job_id: &JobId) -> Result<(), EngineError> {
        self.load_owned(owner_id, job_id)?;

        let removed = self.store.delete_by_id(job_id)?;
        self.invalidate_listing(owner_id)?;

        if !removed {
            return Err(EngineError::JobNotFound {
                job_id: job_id.clone(),
            });
        }
        tracing::info!(owner_id = %owner_id, job_id = %job_id, "job deleted");
        Ok(())
    }

    /// Loads the target of a mutation; ownership is settled before any other rule runs.
    fn load_owned(&self, owner_id: &OwnerId, job_id: &JobId) -> Result<JobRecord, EngineError> {
        let Some(job) = self.store.find_by_id(job_id)? else {
            return Err(EngineError::JobNotFound {
                job_id: job_id.clone(),
            });
        };
        if &job.owner_id != owner_id {
            tracing::warn!(
                owner_id = %owner_id,
                job_id = %job_id,
                "mutation attempted by non-owner"
            );
            return Err(EngineError::NotAuthorized {
                job_id: job_id.clone(),
            });
        }
        Ok(job)
    }

    /// Drops the owner's cached listing, retrying before giving up. A dropped invalidation would
    /// leave a stale listing behind, so failure is reported to the caller.
    fn invalidate_listing(&self, owner_id: &OwnerId) -> Result<(), EngineError> {
        let key = listing_key(owner_id);
        let attempts = self.config.invalidate_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.cache.invalidate(&key) {
                Ok(dropped) => {
                    tracing::debug!(owner_id = %owner_id, dropped, "listing cache invalidated");
                    return Ok(());
                }
                Err(err) if attempt >= attempts => {
                    tracing::warn!(
                        owner_id = %owner_id,
                        attempts,
                        error = %err,
                        "listing cache invalidation failed"
                    );
                    return Err(EngineError::CacheUnavailable {
                        attempts,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        owner_id = %owner_id,
                        attempt,
                        error = %err,
                        "listing cache invalidation failed; retrying"
                    );
                    std::thread::sleep(self.config.invalidate_backoff * attempt);
                    attempt += 1;
                }
            }
        }
    }
}
