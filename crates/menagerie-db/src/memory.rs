//! In-process job store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use menagerie_core::{Error, Job, JobStatus, JobStore, JobUpdate, Result};

/// Job store backed by a `HashMap` behind a tokio `RwLock`.
///
/// Each operation holds the lock for its whole read-modify-write, which makes
/// `update` and `claim` atomic within the process. State is lost on restart.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

fn oldest_first(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    jobs
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &Job) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(Error::DuplicateJob(job.id));
        }
        jobs.insert(job.id, job.clone());
        debug!(subsystem = "db", component = "memory_store", op = "create", job_id = %job.id, "Job created");
        Ok(job.clone())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }

    async fn update(&self, job_id: Uuid, update: JobUpdate) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&job_id).ok_or(Error::JobNotFound(job_id))?;
        job.apply(update)?;
        Ok(job.clone())
    }

    async fn claim(&self, job_id: Uuid) -> Result<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.apply(JobUpdate::processing())?;
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().await;
        Ok(oldest_first(
            jobs.values()
                .filter(|job| job.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().await;
        Ok(oldest_first(jobs.values().cloned().collect()))
    }
}
