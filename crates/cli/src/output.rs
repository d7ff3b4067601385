#![forbid(unsafe_code)]

use crate::validate::ValidationError;
use jobtrack_core::{JobId, JobRecord};
use jobtrack_engine::{EngineError, ErrorKind, UpdateOutcome};
use jobtrack_storage::{CacheError, StoreError};
use serde_json::{Map, Value, json};

pub(crate) const EXIT_USAGE: u8 = 2;
pub(crate) const EXIT_INFRA: u8 = 3;
pub(crate) const EXIT_NOT_FOUND: u8 = 4;
pub(crate) const EXIT_FORBIDDEN: u8 = 5;
pub(crate) const EXIT_CONFLICT: u8 = 6;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("job store could not be opened: {0}")]
    StoreOpen(#[source] StoreError),
    #[error("listing cache could not be opened: {0}")]
    CacheOpen(#[source] CacheError),
    #[error("output encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Invalid(ValidationError::NoFields) => ErrorKind::EmptyUpdate.as_str(),
            Self::Invalid(_) => "invalid_input",
            Self::Engine(err) => err.kind().as_str(),
            Self::StoreOpen(err) if err.is_unavailable() => ErrorKind::StoreUnavailable.as_str(),
            Self::StoreOpen(_) => ErrorKind::StoreFailure.as_str(),
            Self::CacheOpen(_) => ErrorKind::CacheUnavailable.as_str(),
            Self::Encode(_) => "internal",
        }
    }

    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Invalid(_) => EXIT_USAGE,
            Self::Engine(err) => match err.kind() {
                ErrorKind::NoJobsFound | ErrorKind::JobNotFound => EXIT_NOT_FOUND,
                ErrorKind::NotAuthorized => EXIT_FORBIDDEN,
                ErrorKind::DuplicateActiveApplication | ErrorKind::IllegalStatusTransition => {
                    EXIT_CONFLICT
                }
                ErrorKind::EmptyUpdate => EXIT_USAGE,
                ErrorKind::StoreUnavailable
                | ErrorKind::CacheUnavailable
                | ErrorKind::StoreFailure => EXIT_INFRA,
            },
            Self::StoreOpen(_) | Self::CacheOpen(_) | Self::Encode(_) => EXIT_INFRA,
        }
    }

    /// `{"error": {"kind", "message", ...details}}`
    pub(crate) fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("kind".to_string(), Value::String(self.code().to_string()));
        error.insert("message".to_string(), Value::String(self.to_string()));
        if let Self::Engine(err) = self {
            insert_details(&mut error, err);
        }
        if let Some(retryable) = self.retryable() {
            error.insert("retryable".to_string(), Value::Bool(retryable));
        }
        json!({ "error": Value::Object(error) })
    }

    fn retryable(&self) -> Option<bool> {
        match self {
            Self::Engine(err) => Some(err.kind().is_retryable()),
            Self::StoreOpen(err) => Some(err.is_unavailable()),
            Self::CacheOpen(_) => Some(true),
            Self::Invalid(_) | Self::Encode(_) => None,
        }
    }
}

fn insert_details(error: &mut Map<String, Value>, err: &EngineError) {
    match err {
        EngineError::DuplicateActiveApplication { existing, status } => {
            error.insert("existingJobId".to_string(), json!(existing));
            error.insert("existingStatus".to_string(), json!(status));
        }
        EngineError::IllegalStatusTransition { current, requested } => {
            error.insert("current".to_string(), json!(current));
            error.insert("requested".to_string(), json!(requested));
            let allowed = current
                .allowed_next()
                .iter()
                .map(|status| status.as_str())
                .collect::<Vec<_>>();
            error.insert("allowed".to_string(), json!(allowed));
        }
        EngineError::JobNotFound { job_id } | EngineError::NotAuthorized { job_id } => {
            error.insert("jobId".to_string(), json!(job_id));
        }
        EngineError::CacheUnavailable { attempts, .. } => {
            error.insert("attempts".to_string(), json!(attempts));
        }
        EngineError::StoreUnavailable(_)
        | EngineError::NoJobsFound
        | EngineError::EmptyUpdate
        | EngineError::Store(_) => {}
    }
}

pub(crate) fn jobs(listing: &[JobRecord]) -> Result<Value, CliError> {
    Ok(json!({ "jobs": serde_json::to_value(listing)? }))
}

pub(crate) fn job(record: &JobRecord) -> Result<Value, CliError> {
    Ok(json!({ "job": serde_json::to_value(record)? }))
}

pub(crate) fn updated(outcome: &UpdateOutcome) -> Result<Value, CliError> {
    Ok(json!({
        "job": serde_json::to_value(outcome.job())?,
        "changed": !outcome.is_noop(),
    }))
}

pub(crate) fn deleted(job_id: &JobId) -> Value {
    json!({ "deleted": job_id })
}
