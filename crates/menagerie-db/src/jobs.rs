//! PostgreSQL job store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use menagerie_core::{Error, Job, JobStatus, JobStore, JobUpdate, Result};

const JOB_COLUMNS: &str =
    "id, status, requested_count, subject, results, error, created_at, updated_at";

/// PostgreSQL implementation of `JobStore`.
///
/// Every mutation is a single conditional `UPDATE ... RETURNING`, so partial
/// updates apply as one unit and claims have exactly one winner across
/// processes sharing the database.
#[derive(Clone)]
pub struct PgJobStore {
    pool: Pool<Postgres>,
}

impl PgJobStore {
    /// Create a new PgJobStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Parse a job row into a Job struct.
    fn parse_job_row(row: sqlx::postgres::PgRow) -> Result<Job> {
        let status: String = row.try_get("status")?;
        Ok(Job {
            id: row.try_get("id")?,
            status: status.parse()?,
            requested_count: row.try_get("requested_count")?,
            subject: row.try_get("subject")?,
            results: row.try_get("results")?,
            error: row.try_get("error")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn status_strings(statuses: &[JobStatus]) -> Vec<String> {
        statuses.iter().map(|s| s.as_str().to_string()).collect()
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: &Job) -> Result<Job> {
        let row = sqlx::query(&format!(
            "INSERT INTO generation_jobs ({JOB_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(job.id)
        .bind(job.status.as_str())
        .bind(job.requested_count)
        .bind(&job.subject)
        .bind(&job.results)
        .bind(&job.error)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::DuplicateJob(job.id)
            }
            other => Error::Database(other),
        })?;

        debug!(subsystem = "db", component = "pg_store", op = "create", job_id = %job.id, "Job created");
        Self::parse_job_row(row)
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM generation_jobs WHERE id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_job_row).transpose()
    }

    async fn update(&self, job_id: Uuid, update: JobUpdate) -> Result<Job> {
        let allowed = Self::status_strings(&update.source_statuses());
        let target = update.status.map(|s| s.as_str().to_string());

        let row = sqlx::query(&update_sql())
            .bind(job_id)
            .bind(&target)
            .bind(&update.subject)
            .bind(&update.results)
            .bind(&update.error)
            .bind(Utc::now())
            .bind(&allowed)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        if let Some(row) = row {
            return Self::parse_job_row(row);
        }

        // Nothing matched: tell a missing job apart from a forbidden transition.
        match self.get(job_id).await? {
            None => Err(Error::JobNotFound(job_id)),
            Some(current) => Err(Error::InvalidTransition {
                from: current.status,
                to: update.status.unwrap_or(current.status),
            }),
        }
    }

    async fn claim(&self, job_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(&format!(
            "UPDATE generation_jobs
             SET status = 'processing', updated_at = GREATEST($2, updated_at)
             WHERE id = $1 AND status = 'pending'
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(job_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_job_row).transpose()
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM generation_jobs
             WHERE status = $1
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(Self::parse_job_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM generation_jobs ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(Self::parse_job_row).collect()
    }
}

/// Partial update guarded by the statuses the update may apply to.
///
/// Binds: `$1` id, `$2` status, `$3` subject, `$4` results, `$5` error,
/// `$6` now, `$7` allowed source statuses.
fn update_sql() -> String {
    format!(
        "UPDATE generation_jobs
         SET status = COALESCE($2, status),
             subject = COALESCE($3, subject),
             results = COALESCE($4, results),
             error = COALESCE($5, error),
             updated_at = GREATEST($6, updated_at)
         WHERE id = $1 AND status = ANY($7)
         RETURNING {JOB_COLUMNS}"
    )
}
