#![forbid(unsafe_code)]

//! Durable job records and the derived per-owner listing cache.
//!
//! Both halves sit behind small traits so the lifecycle engine can be driven against any
//! backend: [`JobStore`] for the authoritative records and [`ListingCache`] for the
//! serialized listing snapshots.

pub mod cache;
mod store;

pub use cache::{
    CacheError, ListingCache, MemoryListingCache, NoopListingCache, SqliteListingCache,
    listing_key,
};
pub use store::{PairLookup, PairMatch, SqliteStore, StoreError};

use jobtrack_core::{JobChanges, JobId, JobRecord, NewJob, OwnerId};

/// Persistence contract for job records.
///
/// Every failure caused by losing the backend surfaces as [`StoreError::Unavailable`] (see
/// [`StoreError::is_unavailable`]); absence is always reported through `Option`/`bool`, never
/// through an error.
pub trait JobStore {
    /// All records of one owner, newest activity first (`updated_at_ms DESC, created_at_ms DESC,
    /// id ASC`). Duplicated pairs are returned as stored.
    fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<JobRecord>, StoreError>;

    /// Most recently created record matching the pair, if any.
    fn find_one(&self, lookup: PairLookup<'_>) -> Result<Option<JobRecord>, StoreError>;

    fn find_by_id(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError>;

    /// Assigns `id`, `created_at_ms` and `updated_at_ms`.
    fn insert(&mut self, job: NewJob) -> Result<JobRecord, StoreError>;

    /// Applies `changes` and refreshes `updated_at_ms`. `None` when no record has this id.
    fn update_by_id(
        &mut self,
        id: &JobId,
        changes: &JobChanges,
    ) -> Result<Option<JobRecord>, StoreError>;

    fn delete_by_id(&mut self, id: &JobId) -> Result<bool, StoreError>;
}
