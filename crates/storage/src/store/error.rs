#![forbid(unsafe_code)]

use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[source] rusqlite::Error),
    #[error("an active application already holds this (title, company) pair")]
    ActivePairTaken,
    #[error("invalid row: {0}")]
    InvalidRow(&'static str),
    #[error("schema version mismatch (expected={expected}, stored={stored})")]
    SchemaMismatch { expected: i64, stored: i64 },
}

impl StoreError {
    /// Connectivity-class failures. Retryable by the caller; never a signal that data is absent.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if is_connectivity_failure(&value) {
            Self::Unavailable(value)
        } else {
            Self::Sql(value)
        }
    }
}

pub(crate) fn is_connectivity_failure(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, _) => matches!(
            code.code,
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::FileLockingProtocolFailed
                | ErrorCode::ReadOnly
        ),
        _ => false,
    }
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}
