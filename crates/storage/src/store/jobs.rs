#![forbid(unsafe_code)]

use super::*;
use crate::JobStore;
use jobtrack_core::{JobChanges, JobId, JobRecord, JobStatus, NewJob, OwnerId, PairKey};
use rusqlite::{OptionalExtension, params};

const JOB_COLUMNS: &str = "id, owner_id, title, company, status, salary, notes, link, \
                           created_at_ms, updated_at_ms";

/// How `title`/`company` are compared in a [`PairLookup`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PairMatch {
    Exact,
    #[default]
    CaseInsensitive,
}

#[derive(Clone, Copy, Debug)]
pub struct PairLookup<'a> {
    pub owner_id: &'a OwnerId,
    pub title: &'a str,
    pub company: &'a str,
    pub mode: PairMatch,
    /// Record left out of the search, e.g. the one being updated.
    pub exclude: Option<&'a JobId>,
    /// Only consider records whose status is not `Rejected`.
    pub active_only: bool,
}

impl<'a> PairLookup<'a> {
    pub fn new(owner_id: &'a OwnerId, title: &'a str, company: &'a str) -> Self {
        Self {
            owner_id,
            title,
            company,
            mode: PairMatch::CaseInsensitive,
            exclude: None,
            active_only: false,
        }
    }

    pub fn excluding(mut self, id: Option<&'a JobId>) -> Self {
        self.exclude = id;
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }
}

impl JobStore for SqliteStore {
    fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<JobRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE owner_id=?1 \
             ORDER BY updated_at_ms DESC, created_at_ms DESC, id ASC"
        ))?;

        let mut rows = stmt.query(params![owner_id.as_str()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_job_row(row)?);
        }
        Ok(out)
    }

    fn find_one(&self, lookup: PairLookup<'_>) -> Result<Option<JobRecord>, StoreError> {
        let (title_column, company_column, title, company) = match lookup.mode {
            PairMatch::Exact => (
                "title",
                "company",
                lookup.title.to_string(),
                lookup.company.to_string(),
            ),
            PairMatch::CaseInsensitive => {
                let key = PairKey::new(lookup.title, lookup.company);
                (
                    "title_key",
                    "company_key",
                    key.title().to_string(),
                    key.company().to_string(),
                )
            }
        };

        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE owner_id=?1 AND {title_column}=?2 AND {company_column}=?3 \
               AND (?4 IS NULL OR id <> ?4) \
               AND (?5 = 0 OR status <> 'Rejected') \
             ORDER BY created_at_ms DESC, seq DESC \
             LIMIT 1"
        );

        let row = self
            .conn
            .query_row(
                &sql,
                params![
                    lookup.owner_id.as_str(),
                    title,
                    company,
                    lookup.exclude.map(JobId::as_str),
                    lookup.active_only,
                ],
                |row| Ok(read_job_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn find_by_id(&self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id=?1"),
                params![id.as_str()],
                |row| Ok(read_job_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn insert(&mut self, job: NewJob) -> Result<JobRecord, StoreError> {
        let now_ms = now_ms();
        let record = JobRecord {
            id: JobId::generate(),
            owner_id: job.owner_id,
            title: job.title,
            company: job.company,
            status: job.status,
            salary: job.salary,
            notes: job.notes,
            link: job.link,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        let key = record.pair_key();

        let insert = self.conn.execute(
            "INSERT INTO jobs(id, owner_id, title, company, title_key, company_key, status, \
                              salary, notes, link, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.id.as_str(),
                record.owner_id.as_str(),
                record.title,
                record.company,
                key.title(),
                key.company(),
                record.status.as_str(),
                record.salary,
                record.notes,
                record.link,
                record.created_at_ms,
                record.updated_at_ms,
            ],
        );

        if let Err(err) = insert {
            return Err(map_write_error(err));
        }

        Ok(record)
    }

    fn update_by_id(
        &mut self,
        id: &JobId,
        changes: &JobChanges,
    ) -> Result<Option<JobRecord>, StoreError> {
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id=?1"),
                params![id.as_str()],
                |row| Ok(read_job_row(row)),
            )
            .optional()?
            .transpose()?;

        let Some(mut record) = current else {
            return Ok(None);
        };

        changes.apply_to(&mut record);
        record.updated_at_ms = now_ms().max(record.updated_at_ms);
        let key = record.pair_key();

        let update = tx.execute(
            "UPDATE jobs \
             SET title=?2, company=?3, title_key=?4, company_key=?5, status=?6, \
                 salary=?7, notes=?8, link=?9, updated_at_ms=?10 \
             WHERE id=?1",
            params![
                record.id.as_str(),
                record.title,
                record.company,
                key.title(),
                key.company(),
                record.status.as_str(),
                record.salary,
                record.notes,
                record.link,
                record.updated_at_ms,
            ],
        );

        if let Err(err) = update {
            return Err(map_write_error(err));
        }

        tx.commit()?;
        Ok(Some(record))
    }

    fn delete_by_id(&mut self, id: &JobId) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM jobs WHERE id=?1", params![id.as_str()])?;
        Ok(deleted > 0)
    }
}

fn read_job_row(row: &rusqlite::Row<'_>) -> Result<JobRecord, StoreError> {
    let id = JobId::try_new(row.get::<_, String>(0)?)
        .map_err(|_| StoreError::InvalidRow("invalid job id"))?;
    let owner_id = OwnerId::try_new(row.get::<_, String>(1)?)
        .map_err(|_| StoreError::InvalidRow("invalid owner id"))?;
    let status = row
        .get::<_, String>(4)?
        .parse::<JobStatus>()
        .map_err(|_| StoreError::InvalidRow("invalid job status"))?;

    Ok(JobRecord {
        id,
        owner_id,
        title: row.get(2)?,
        company: row.get(3)?,
        status,
        salary: row.get(5)?,
        notes: row.get(6)?,
        link: row.get(7)?,
        created_at_ms: row.get(8)?,
        updated_at_ms: row.get(9)?,
    })
}

fn map_write_error(err: rusqlite::Error) -> StoreError {
    let pair_violation = is_constraint_violation(&err)
        && match &err {
            rusqlite::Error::SqliteFailure(_, Some(message)) => message.contains("title_key"),
            _ => false,
        };
    if pair_violation {
        return StoreError::ActivePairTaken;
    }
    StoreError::from(err)
}
