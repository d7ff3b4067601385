#![forbid(unsafe_code)]

use crate::ids::{JobId, OwnerId};
use crate::pair::PairKey;
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    pub owner_id: OwnerId,
    pub title: String,
    pub company: String,
    pub status: JobStatus,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at_ms: i64,
}

impl JobRecord {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.title, &self.company)
    }
}

/// Caller-supplied fields of a new application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl JobInput {
    pub fn into_new_job(self, owner_id: OwnerId) -> NewJob {
        NewJob {
            owner_id,
            title: self.title,
            company: self.company,
            status: self.status,
            salary: normalize_optional(self.salary),
            notes: normalize_optional(self.notes),
            link: normalize_optional(self.link),
        }
    }
}

/// Row handed to the store for insertion; the store assigns id and timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewJob {
    pub owner_id: OwnerId,
    pub title: String,
    pub company: String,
    pub status: JobStatus,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub link: Option<String>,
}

/// Partial update request. `None` means "not supplied".
///
/// For `salary`, `notes` and `link` an empty string clears the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.status.is_none()
            && self.salary.is_none()
            && self.notes.is_none()
            && self.link.is_none()
    }

    /// Field-by-field comparison against the stored record.
    ///
    /// Participating fields: title, company, status, salary, notes, link. Identity and
    /// timestamps never take part. Title and company compare exactly, so a case-only edit is a
    /// real change even though the pair key stays the same.
    pub fn diff(&self, current: &JobRecord) -> JobChanges {
        JobChanges {
            title: self
                .title
                .as_ref()
                .filter(|title| **title != current.title)
                .cloned(),
            company: self
                .company
                .as_ref()
                .filter(|company| **company != current.company)
                .cloned(),
            status: self.status.filter(|status| *status != current.status),
            salary: diff_optional(self.salary.as_deref(), current.salary.as_deref()),
            notes: diff_optional(self.notes.as_deref(), current.notes.as_deref()),
            link: diff_optional(self.link.as_deref(), current.link.as_deref()),
        }
    }
}

/// The subset of a patch that actually differs from the stored record.
///
/// For the optional text fields the outer `Option` says whether the field changes and the inner
/// one carries the new value (`None` clears it).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobChanges {
    pub title: Option<String>,
    pub company: Option<String>,
    pub status: Option<JobStatus>,
    pub salary: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub link: Option<Option<String>>,
}

impl JobChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.status.is_none()
            && self.salary.is_none()
            && self.notes.is_none()
            && self.link.is_none()
    }

    pub fn apply_to(&self, record: &mut JobRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(company) = &self.company {
            record.company = company.clone();
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(salary) = &self.salary {
            record.salary = salary.clone();
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(link) = &self.link {
            record.link = link.clone();
        }
    }
}

fn normalize_optional(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

fn diff_optional(requested: Option<&str>, current: Option<&str>) -> Option<Option<String>> {
    let requested = requested?;
    let desired = if requested.trim().is_empty() {
        None
    } else {
        Some(requested)
    };
    if desired == current {
        None
    } else {
        Some(desired.map(str::to_string))
    }
}
