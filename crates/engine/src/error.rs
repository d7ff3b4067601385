#![forbid(unsafe_code)]

use jobtrack_core::{JobId, JobStatus};
use jobtrack_storage::{CacheError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("job store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("listing cache could not be invalidated after {attempts} attempts: {source}")]
    CacheUnavailable {
        attempts: u32,
        #[source]
        source: CacheError,
    },

    #[error("no jobs found")]
    NoJobsFound,

    #[error(
        "an active application for this title and company already exists (job {existing}, status {status})"
    )]
    DuplicateActiveApplication { existing: JobId, status: JobStatus },

    #[error("status cannot change from {current} to {requested}")]
    IllegalStatusTransition {
        current: JobStatus,
        requested: JobStatus,
    },

    #[error("job not found: {job_id}")]
    JobNotFound { job_id: JobId },

    #[error("not authorized to modify job {job_id}")]
    NotAuthorized { job_id: JobId },

    #[error("update request carries no fields")]
    EmptyUpdate,

    #[error("job store failure: {0}")]
    Store(#[source] StoreError),
}

/// Machine-checkable classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StoreUnavailable,
    CacheUnavailable,
    NoJobsFound,
    DuplicateActiveApplication,
    IllegalStatusTransition,
    JobNotFound,
    NotAuthorized,
    EmptyUpdate,
    StoreFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::StoreUnavailable => "store_unavailable",
            ErrorKind::CacheUnavailable => "cache_unavailable",
            ErrorKind::NoJobsFound => "no_jobs_found",
            ErrorKind::DuplicateActiveApplication => "duplicate_active_application",
            ErrorKind::IllegalStatusTransition => "illegal_status_transition",
            ErrorKind::JobNotFound => "job_not_found",
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::EmptyUpdate => "empty_update",
            ErrorKind::StoreFailure => "store_failure",
        }
    }

    /// Infrastructure kinds the caller may retry. Business-rule kinds are terminal.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::StoreUnavailable | ErrorKind::CacheUnavailable
        )
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::CacheUnavailable { .. } => ErrorKind::CacheUnavailable,
            Self::NoJobsFound => ErrorKind::NoJobsFound,
            Self::DuplicateActiveApplication { .. } => ErrorKind::DuplicateActiveApplication,
            Self::IllegalStatusTransition { .. } => ErrorKind::IllegalStatusTransition,
            Self::JobNotFound { .. } => ErrorKind::JobNotFound,
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::EmptyUpdate => ErrorKind::EmptyUpdate,
            Self::Store(_) => ErrorKind::StoreFailure,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        if value.is_unavailable() {
            Self::StoreUnavailable(value)
        } else {
            Self::Store(value)
        }
    }
}

impl From<jobtrack_core::IllegalTransition> for EngineError {
    fn from(value: jobtrack_core::IllegalTransition) -> Self {
        Self::IllegalStatusTransition {
            current: value.current,
            requested: value.requested,
        }
    }
}
