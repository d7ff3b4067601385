#![forbid(unsafe_code)]

//! Field-shape checks applied before a request reaches the lifecycle engine.

use crate::config::{AddArgs, EditArgs};
use jobtrack_core::{JobId, JobInput, JobPatch, JobStatus, OwnerId};

pub(crate) const MAX_TITLE_CHARS: usize = 200;
pub(crate) const MAX_COMPANY_CHARS: usize = 100;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("status is invalid (expected Wishlist|Applied|Interviewing|Offer|Rejected): {0}")]
    Status(String),
    #[error("link must be an http:// or https:// URL")]
    Link,
    #[error("owner is required (--owner or JOBTRACK_OWNER)")]
    MissingOwner,
    #[error("owner is invalid: {0}")]
    Owner(&'static str),
    #[error("job id is invalid: {0}")]
    JobId(String),
    #[error("update needs at least one field")]
    NoFields,
}

pub(crate) fn owner(raw: Option<&str>) -> Result<OwnerId, ValidationError> {
    let raw = raw.ok_or(ValidationError::MissingOwner)?;
    OwnerId::try_new(raw).map_err(|err| ValidationError::Owner(err.message()))
}

pub(crate) fn job_id(raw: &str) -> Result<JobId, ValidationError> {
    JobId::try_new(raw).map_err(|err| ValidationError::JobId(err.to_string()))
}

pub(crate) fn new_job(args: AddArgs) -> Result<JobInput, ValidationError> {
    Ok(JobInput {
        title: normalize_title(&args.title)?,
        company: normalize_company(&args.company)?,
        status: normalize_status(&args.status)?,
        salary: args.salary.as_deref().map(normalize_text),
        notes: args.notes.as_deref().map(normalize_text),
        link: args.link.as_deref().map(normalize_link).transpose()?,
    })
}

/// Returns the target id and the patch. Empty `salary`/`notes`/`link` are kept as `""` so the
/// engine clears them.
pub(crate) fn patch(args: EditArgs) -> Result<(JobId, JobPatch), ValidationError> {
    let job_id = job_id(&args.job_id)?;
    let patch = JobPatch {
        title: args.title.as_deref().map(normalize_title).transpose()?,
        company: args.company.as_deref().map(normalize_company).transpose()?,
        status: args.status.as_deref().map(normalize_status).transpose()?,
        salary: args.salary.as_deref().map(normalize_text),
        notes: args.notes.as_deref().map(normalize_text),
        link: args.link.as_deref().map(normalize_link).transpose()?,
    };
    if patch.is_empty() {
        return Err(ValidationError::NoFields);
    }
    Ok((job_id, patch))
}

fn normalize_title(raw: &str) -> Result<String, ValidationError> {
    normalize_bounded("title", raw, MAX_TITLE_CHARS)
}

fn normalize_company(raw: &str) -> Result<String, ValidationError> {
    normalize_bounded("company", raw, MAX_COMPANY_CHARS)
}

fn normalize_bounded(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if raw.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(raw.to_string())
}

fn normalize_status(raw: &str) -> Result<JobStatus, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::Status(raw.trim().to_string()))
}

fn normalize_text(raw: &str) -> String {
    raw.trim().to_string()
}

fn normalize_link(raw: &str) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    let lower = raw.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .ok_or(ValidationError::Link)?;
    if rest.is_empty() || rest.starts_with('/') || raw.chars().any(char::is_whitespace) {
        return Err(ValidationError::Link);
    }
    Ok(raw.to_string())
}
