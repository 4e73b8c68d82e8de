//! Operations a request layer calls.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use menagerie_core::defaults::{MAX_IMAGES_PER_JOB, MIN_IMAGES_PER_JOB};
use menagerie_core::{Classification, Error, GenerationProvider, Job, JobStore, Result};

/// Inclusive range of images a single job may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobBounds {
    min: i32,
    max: i32,
}

impl Default for JobBounds {
    fn default() -> Self {
        Self {
            min: MIN_IMAGES_PER_JOB,
            max: MAX_IMAGES_PER_JOB,
        }
    }
}

impl JobBounds {
    /// Requires `1 <= min <= max`.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min < 1 || min > max {
            return Err(Error::Config(format!(
                "Invalid image count bounds: min={}, max={}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn validate(&self, requested_count: i32) -> Result<()> {
        if (self.min..=self.max).contains(&requested_count) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "requested_count must be between {} and {}, got {}",
                self.min, self.max, requested_count
            )))
        }
    }
}

/// Job submission, lookup, and classification.
///
/// Creating a job only records it; the worker picks it up on its next tick.
#[derive(Clone)]
pub struct GenerationService {
    store: Arc<dyn JobStore>,
    provider: Arc<dyn GenerationProvider>,
    bounds: JobBounds,
}

impl GenerationService {
    pub fn new(
        store: Arc<dyn JobStore>,
        provider: Arc<dyn GenerationProvider>,
        bounds: JobBounds,
    ) -> Self {
        Self {
            store,
            provider,
            bounds,
        }
    }

    pub fn bounds(&self) -> JobBounds {
        self.bounds
    }

    /// Record a new pending job for `requested_count` images.
    pub async fn create_job(&self, requested_count: i32) -> Result<Job> {
        self.bounds.validate(requested_count)?;

        let job = self.store.create(&Job::new(requested_count)).await?;
        info!(
            subsystem = "jobs",
            component = "service",
            op = "create",
            job_id = %job.id,
            requested_count,
            "Job accepted"
        );
        Ok(job)
    }

    /// Current state of a job. Never modifies it.
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        self.store
            .get(job_id)
            .await?
            .ok_or(Error::JobNotFound(job_id))
    }

    /// All jobs, oldest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.store.list_all().await
    }

    /// Identify animals in an image. Failures are reported in the result.
    pub async fn classify_image(&self, image_url: &str) -> Classification {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Classification::failed("Image URL must not be empty");
        }
        self.provider.classify_image(image_url).await
    }
}
