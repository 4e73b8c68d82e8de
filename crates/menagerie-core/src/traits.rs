//! Core traits for menagerie abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ProviderError, Result};
use crate::models::*;

// =============================================================================
// JOB STORE
// =============================================================================

/// Durable keyed record of job state.
///
/// Every mutation goes through this trait. Implementations must apply each
/// `update` and `claim` atomically with respect to concurrent writers on the
/// same id.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. Fails with `Error::DuplicateJob` if the id exists.
    async fn create(&self, job: &Job) -> Result<Job>;

    /// Get job by ID.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Apply a partial update and bump `updated_at`.
    ///
    /// Fails with `Error::JobNotFound` for unknown ids and
    /// `Error::InvalidTransition` when the state machine forbids the change.
    async fn update(&self, job_id: Uuid, update: JobUpdate) -> Result<Job>;

    /// Conditionally move a job from `Pending` to `Processing`.
    ///
    /// Returns `None` when the job does not exist or is no longer pending, so at
    /// most one caller ever wins the claim for a given job.
    async fn claim(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Snapshot of all jobs in the given status, oldest first.
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>>;

    /// All jobs, oldest first.
    async fn list_all(&self) -> Result<Vec<Job>>;
}

// =============================================================================
// GENERATION PROVIDER
// =============================================================================

/// Capability that turns prompts into images and recognises animals in them.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate `count` images for `prompt`.
    ///
    /// Each entry is a URL or an inline `data:` payload. The number of entries
    /// is whatever the provider produced.
    async fn generate_images(
        &self,
        prompt: &str,
        count: usize,
    ) -> std::result::Result<Vec<String>, ProviderError>;

    /// Identify animals in the image at `image_url`.
    async fn classify_image(&self, image_url: &str) -> Classification;

    /// Provider identifier for logging.
    fn name(&self) -> &str;
}
