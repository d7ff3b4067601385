#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_OWNER_ID_LEN: usize = 128;
const MAX_JOB_ID_LEN: usize = 64;

/// Verified identity of the user owning a set of job records.
///
/// The identity layer hands this value over already authenticated; the only checks applied
/// here keep it usable as a storage and cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
        let value = value.into();
        validate_owner_id(&value)?;
        Ok(Self(value))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = OwnerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl OwnerIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "owner id must not be empty",
            Self::TooLong => "owner id is too long",
            Self::ContainsControl => "owner id contains control characters",
        }
    }
}

impl fmt::Display for OwnerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for OwnerIdError {}

fn validate_owner_id(value: &str) -> Result<(), OwnerIdError> {
    if value.trim().is_empty() {
        return Err(OwnerIdError::Empty);
    }
    if value.len() > MAX_OWNER_ID_LEN {
        return Err(OwnerIdError::TooLong);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(OwnerIdError::ContainsControl);
    }
    Ok(())
}

/// Stable external identifier of a job record. Assigned once by the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, JobIdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(JobIdError::Empty);
        }
        if trimmed.len() > MAX_JOB_ID_LEN {
            return Err(JobIdError::TooLong);
        }
        if let Some((index, ch)) = trimmed
            .chars()
            .enumerate()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '-'))
        {
            return Err(JobIdError::InvalidChar { ch, index });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for JobId {
    type Error = JobIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<JobId> for String {
    fn from(value: JobId) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobIdError {
    Empty,
    TooLong,
    InvalidChar { ch: char, index: usize },
}

impl fmt::Display for JobIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("job id must not be empty"),
            Self::TooLong => f.write_str("job id is too long"),
            Self::InvalidChar { ch, index } => {
                write!(f, "job id has invalid character {ch:?} at index {index}")
            }
        }
    }
}

impl std::error::Error for JobIdError {}
