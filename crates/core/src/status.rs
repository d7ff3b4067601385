#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline position of a job application.
///
/// `Rejected` closes a record for good: the pair can only be pursued again through a new record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Wishlist,
    Applied,
    Interviewing,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Wishlist,
        JobStatus::Applied,
        JobStatus::Interviewing,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Wishlist => "Wishlist",
            JobStatus::Applied => "Applied",
            JobStatus::Interviewing => "Interviewing",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }

    pub fn is_active(self) -> bool {
        self != JobStatus::Rejected
    }

    /// Statuses reachable from `self` through a single edit.
    pub fn allowed_next(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Wishlist => &[JobStatus::Applied, JobStatus::Rejected],
            JobStatus::Applied => &[JobStatus::Interviewing, JobStatus::Rejected],
            JobStatus::Interviewing => &[JobStatus::Offer, JobStatus::Rejected],
            JobStatus::Offer => &[JobStatus::Rejected],
            JobStatus::Rejected => &[],
        }
    }

    pub fn is_transition_allowed(self, next: JobStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Checks a requested change against the transition table.
    ///
    /// Callers treat `next == self` as "no change" and never ask.
    pub fn check_transition(self, next: JobStatus) -> Result<(), IllegalTransition> {
        if self.is_transition_allowed(next) {
            Ok(())
        } else {
            Err(IllegalTransition {
                current: self,
                requested: next,
            })
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStatus(trimmed.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status must be one of [Wishlist, Applied, Interviewing, Offer, Rejected] (got {:?})",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IllegalTransition {
    pub current: JobStatus,
    pub requested: JobStatus,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status cannot change from {} to {}",
            self.current, self.requested
        )
    }
}

impl std::error::Error for IllegalTransition {}
