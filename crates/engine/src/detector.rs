#![forbid(unsafe_code)]

use crate::EngineError;
use jobtrack_core::{JobId, JobRecord, OwnerId};
use jobtrack_storage::{JobStore, PairLookup};

/// Outcome of a duplicate check that allows the write to go ahead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// No record of this owner carries the pair.
    Clear,
    /// The latest record with this pair was rejected; a new round may start next to it.
    AfterRejection { rejected: JobId },
}

/// Decides whether a (title, company) pair may be written for an owner.
///
/// Always reads the authoritative store, never the listing cache.
pub struct DuplicateDetector<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: JobStore + ?Sized> DuplicateDetector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn check(
        &self,
        owner_id: &OwnerId,
        title: &str,
        company: &str,
        exclude: Option<&JobId>,
    ) -> Result<DuplicateCheck, EngineError> {
        let latest = self
            .store
            .find_one(PairLookup::new(owner_id, title, company).excluding(exclude))?;
        assess_latest_match(latest.as_ref())
    }

    /// Explains a store-level uniqueness rejection by naming the active record holding the
    /// pair. Falls back to the raw store error when that record is already gone again.
    pub fn explain_conflict(
        &self,
        owner_id: &OwnerId,
        title: &str,
        company: &str,
        exclude: Option<&JobId>,
    ) -> EngineError {
        let lookup = PairLookup::new(owner_id, title, company)
            .excluding(exclude)
            .active_only();
        match self.store.find_one(lookup) {
            Ok(Some(active)) => EngineError::DuplicateActiveApplication {
                existing: active.id,
                status: active.status,
            },
            Ok(None) => EngineError::Store(jobtrack_storage::StoreError::ActivePairTaken),
            Err(err) => err.into(),
        }
    }
}

/// Only the most recently created match decides: rejected means a new round may open, anything
/// else is a live application that blocks the write.
pub fn assess_latest_match(latest: Option<&JobRecord>) -> Result<DuplicateCheck, EngineError> {
    match latest {
        None => Ok(DuplicateCheck::Clear),
        Some(record) if !record.status.is_active() => Ok(DuplicateCheck::AfterRejection {
            rejected: record.id.clone(),
        }),
        Some(record) => Err(EngineError::DuplicateActiveApplication {
            existing: record.id.clone(),
            status: record.status,
        }),
    }
}
