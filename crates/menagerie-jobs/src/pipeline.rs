//! Per-job execution: claim, generate, persist.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use menagerie_core::defaults::JOB_TIMEOUT_SECS;
use menagerie_core::{GenerationProvider, JobStore, JobUpdate};

use crate::catalog::{build_prompt, SubjectCatalog};
use crate::worker::WorkerEvent;

/// Recorded when a provider fails without saying why.
pub const GENERATION_FAILED: &str = "Generation failed";

/// Error text stored on a failed job; never blank.
fn failure_message(message: String) -> String {
    if message.trim().is_empty() {
        GENERATION_FAILED.to_string()
    } else {
        message
    }
}

fn timeout_message(timeout: Duration) -> String {
    format!("Generation exceeded timeout of {:?}", timeout)
}

/// What happened to a job handed to [`JobExecutor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The job was absent or already claimed elsewhere.
    Skipped,
    /// Results were persisted.
    Completed { result_count: usize },
    /// The provider failed and the error was persisted.
    Failed { error: String },
    /// The terminal write failed; the job is left in processing.
    Stuck { error: String },
}

/// Runs one job through its lifecycle.
///
/// Cheap to clone; every spawned task gets its own copy.
#[derive(Clone)]
pub struct JobExecutor {
    store: Arc<dyn JobStore>,
    provider: Arc<dyn GenerationProvider>,
    catalog: Arc<SubjectCatalog>,
    job_timeout: Duration,
    event_tx: Option<broadcast::Sender<WorkerEvent>>,
}

impl JobExecutor {
    pub fn new(store: Arc<dyn JobStore>, provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            store,
            provider,
            catalog: Arc::new(SubjectCatalog::animals()),
            job_timeout: Duration::from_secs(JOB_TIMEOUT_SECS),
            event_tx: None,
        }
    }

    pub fn with_catalog(mut self, catalog: SubjectCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Upper bound on one provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Publish lifecycle events on this channel.
    pub fn with_events(mut self, event_tx: broadcast::Sender<WorkerEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    fn emit(&self, event: WorkerEvent) {
        if let Some(ref tx) = self.event_tx {
            // No subscribers is fine.
            let _ = tx.send(event);
        }
    }

    /// Execute the job with the given id.
    ///
    /// Never returns an error: every failure ends up in the job record, in the
    /// logs, or in the returned outcome.
    pub async fn execute(&self, job_id: Uuid) -> ExecutionOutcome {
        let start = Instant::now();

        let job = match self.store.claim(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                warn!(
                    subsystem = "jobs",
                    component = "pipeline",
                    op = "claim",
                    %job_id,
                    "Job is missing or no longer pending, skipping"
                );
                self.emit(WorkerEvent::JobSkipped { job_id });
                return ExecutionOutcome::Skipped;
            }
            Err(e) => {
                // Claim never happened, so the job stays pending for the next tick.
                error!(
                    subsystem = "jobs",
                    component = "pipeline",
                    op = "claim",
                    %job_id,
                    error = %e,
                    "Failed to claim job"
                );
                self.emit(WorkerEvent::JobSkipped { job_id });
                return ExecutionOutcome::Skipped;
            }
        };

        let subject = self.catalog.choose().to_string();
        let prompt = build_prompt(&subject);
        let requested = usize::try_from(job.requested_count).unwrap_or(0);

        info!(
            subsystem = "jobs",
            component = "pipeline",
            op = "execute",
            %job_id,
            subject = %subject,
            provider = self.provider.name(),
            requested_count = requested,
            "Processing job"
        );
        self.emit(WorkerEvent::JobStarted {
            job_id,
            subject: subject.clone(),
        });

        let generation = tokio::time::timeout(
            self.job_timeout,
            self.provider.generate_images(&prompt, requested),
        )
        .await;

        let update = match generation {
            Ok(Ok(results)) => {
                if results.len() != requested {
                    warn!(
                        subsystem = "jobs",
                        component = "pipeline",
                        %job_id,
                        requested_count = requested,
                        result_count = results.len(),
                        "Provider returned a different number of images than requested"
                    );
                }
                JobUpdate::completed(subject.clone(), results)
            }
            Ok(Err(e)) => {
                warn!(
                    subsystem = "jobs",
                    component = "pipeline",
                    %job_id,
                    error = %e,
                    "Generation failed"
                );
                JobUpdate::failed(failure_message(e.message))
            }
            Err(_) => {
                let message = timeout_message(self.job_timeout);
                warn!(
                    subsystem = "jobs",
                    component = "pipeline",
                    %job_id,
                    "{}",
                    message
                );
                JobUpdate::failed(message)
            }
        };

        let failure = update.error.clone();
        let duration_ms = start.elapsed().as_millis() as u64;

        match self.store.update(job_id, update).await {
            Ok(job) => match failure {
                None => {
                    let result_count = job.results.as_ref().map_or(0, Vec::len);
                    info!(
                        subsystem = "jobs",
                        component = "pipeline",
                        %job_id,
                        subject = %subject,
                        result_count,
                        duration_ms,
                        "Job completed"
                    );
                    self.emit(WorkerEvent::JobCompleted {
                        job_id,
                        subject,
                        result_count,
                    });
                    ExecutionOutcome::Completed { result_count }
                }
                Some(error) => {
                    debug!(subsystem = "jobs", component = "pipeline", %job_id, duration_ms, "Job failure recorded");
                    self.emit(WorkerEvent::JobFailed {
                        job_id,
                        error: error.clone(),
                    });
                    ExecutionOutcome::Failed { error }
                }
            },
            Err(e) => {
                error!(
                    subsystem = "jobs",
                    component = "pipeline",
                    op = "persist",
                    %job_id,
                    error = %e,
                    duration_ms,
                    "Failed to persist job outcome; job left in processing"
                );
                let error = e.to_string();
                self.emit(WorkerEvent::JobStuck {
                    job_id,
                    error: error.clone(),
                });
                ExecutionOutcome::Stuck { error }
            }
        }
    }
}
