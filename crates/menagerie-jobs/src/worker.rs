//! Polling worker that discovers pending jobs and dispatches them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use menagerie_core::{GenerationProvider, JobStatus, JobStore, Result};

use crate::catalog::SubjectCatalog;
use crate::pipeline::{ExecutionOutcome, JobExecutor};
use crate::DEFAULT_POLL_INTERVAL_MS;

/// Configuration for the job worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between ticks in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum number of jobs executing at once within a tick.
    pub max_concurrent_jobs: usize,
    /// Upper bound on one provider call in seconds.
    pub job_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_concurrent_jobs: menagerie_core::defaults::JOB_MAX_CONCURRENT,
            job_timeout_secs: menagerie_core::defaults::JOB_TIMEOUT_SECS,
        }
    }
}

impl WorkerConfig {
    /// Create a new config with custom poll interval.
    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set maximum concurrent jobs. Values below 1 are raised to 1.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    /// Set the provider call timeout.
    pub fn with_job_timeout(mut self, secs: u64) -> Self {
        self.job_timeout_secs = secs;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

/// Event emitted by the job worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Worker loop started.
    WorkerStarted,
    /// Worker loop exited.
    WorkerStopped,
    /// A job was claimed and a subject chosen.
    JobStarted { job_id: Uuid, subject: String },
    /// A job completed successfully.
    JobCompleted {
        job_id: Uuid,
        subject: String,
        result_count: usize,
    },
    /// A job failed.
    JobFailed { job_id: Uuid, error: String },
    /// A job could not be claimed.
    JobSkipped { job_id: Uuid },
    /// A job's outcome could not be persisted.
    JobStuck { job_id: Uuid, error: String },
}

/// Counts for one discovery-and-dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Pending jobs found at the start of the tick.
    pub discovered: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub stuck: usize,
    /// Tasks that panicked instead of returning an outcome.
    pub panicked: usize,
}

impl TickSummary {
    fn record(&mut self, outcome: &ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Skipped => self.skipped += 1,
            ExecutionOutcome::Completed { .. } => self.completed += 1,
            ExecutionOutcome::Failed { .. } => self.failed += 1,
            ExecutionOutcome::Stuck { .. } => self.stuck += 1,
        }
    }
}

struct RunState {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

/// Job worker that polls the store for pending jobs.
///
/// Built once by the composition root with its store and provider, then
/// driven through [`start`](Self::start) and [`stop`](Self::stop), or one
/// tick at a time through [`run_once`](Self::run_once).
pub struct JobWorker {
    config: WorkerConfig,
    executor: JobExecutor,
    event_tx: broadcast::Sender<WorkerEvent>,
    state: Mutex<Option<RunState>>,
}

impl JobWorker {
    /// Create a new job worker.
    pub fn new(
        store: Arc<dyn JobStore>,
        provider: Arc<dyn GenerationProvider>,
        config: WorkerConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(menagerie_core::defaults::EVENT_BUS_CAPACITY);
        let executor = JobExecutor::new(store, provider)
            .with_timeout(config.job_timeout())
            .with_events(event_tx.clone());
        Self {
            config,
            executor,
            event_tx,
            state: Mutex::new(None),
        }
    }

    /// Draw subjects from `catalog` instead of the built-in animals.
    pub fn with_catalog(mut self, catalog: SubjectCatalog) -> Self {
        self.executor = self.executor.with_catalog(catalog);
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// The executor used for dispatched jobs.
    pub fn executor(&self) -> &JobExecutor {
        &self.executor
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_tx.subscribe()
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<RunState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the polling loop is currently running.
    pub fn is_running(&self) -> bool {
        self.lock_state()
            .as_ref()
            .is_some_and(|state| !state.task.is_finished())
    }

    /// Spawn the polling loop.
    ///
    /// Returns `false` without spawning anything if the loop is already running.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut state = self.lock_state();
        if state.as_ref().is_some_and(|s| !s.task.is_finished()) {
            warn!(
                subsystem = "jobs",
                component = "worker",
                "Job worker is already running"
            );
            return false;
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let worker = Arc::clone(self);
        let task = tokio::spawn(async move {
            worker.run(shutdown_rx).await;
        });

        *state = Some(RunState { shutdown_tx, task });
        true
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// The current tick's executions finish first. No-op when not running.
    pub async fn stop(&self) {
        let state = self.lock_state().take();
        let Some(RunState { shutdown_tx, task }) = state else {
            debug!(subsystem = "jobs", component = "worker", "Job worker is not running");
            return;
        };

        // The loop may already have exited; then the send fails and that's fine.
        let _ = shutdown_tx.send(()).await;
        if let Err(e) = task.await {
            error!(subsystem = "jobs", component = "worker", error = ?e, "Job worker task panicked");
        }
    }

    #[instrument(skip(self, shutdown_rx), fields(subsystem = "jobs", component = "worker"))]
    async fn run(&self, mut shutdown_rx: mpsc::Receiver<()>) {
        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            max_concurrent = self.config.max_concurrent_jobs,
            job_timeout_secs = self.config.job_timeout_secs,
            "Job worker started"
        );
        let _ = self.event_tx.send(WorkerEvent::WorkerStarted);

        let poll_interval = self.config.poll_interval();

        loop {
            // Check for shutdown before starting a tick
            if shutdown_rx.try_recv().is_ok() {
                info!("Job worker received shutdown signal");
                break;
            }

            match self.run_once().await {
                Ok(summary) if summary.discovered > 0 => {
                    debug!(?summary, "Tick finished");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Job worker tick failed");
                }
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Job worker received shutdown signal");
                    break;
                }
                _ = sleep(poll_interval) => {}
            }
        }

        let _ = self.event_tx.send(WorkerEvent::WorkerStopped);
        info!("Job worker stopped");
    }

    /// Dispatch every currently pending job and wait for all of them.
    ///
    /// At most `max_concurrent_jobs` execute at once. A failing or panicking
    /// job does not affect its siblings. Errors only when the pending
    /// snapshot cannot be read.
    pub async fn run_once(&self) -> Result<TickSummary> {
        let pending = self
            .executor
            .store()
            .list_by_status(JobStatus::Pending)
            .await?;

        let mut summary = TickSummary {
            discovered: pending.len(),
            ..TickSummary::default()
        };
        if pending.is_empty() {
            return Ok(summary);
        }

        debug!(
            subsystem = "jobs",
            component = "worker",
            pending_count = pending.len(),
            "Dispatching pending jobs"
        );

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_jobs.max(1)));
        let mut tasks = JoinSet::new();

        for job in pending {
            let executor = self.executor.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return ExecutionOutcome::Skipped;
                };
                executor.execute(job.id).await
            });
        }

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!(subsystem = "jobs", component = "worker", error = ?e, "Job task panicked");
                    summary.panicked += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.job_timeout_secs, 300);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_worker_config_builder() {
        let config = WorkerConfig::default()
            .with_poll_interval(250)
            .with_max_concurrent(8)
            .with_job_timeout(30);

        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.max_concurrent_jobs, 8);
        assert_eq!(config.job_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_worker_config_max_concurrent_floor() {
        let config = WorkerConfig::default().with_max_concurrent(0);
        assert_eq!(config.max_concurrent_jobs, 1);
    }

    #[test]
    fn test_tick_summary_record() {
        let mut summary = TickSummary::default();
        summary.record(&ExecutionOutcome::Completed { result_count: 2 });
        summary.record(&ExecutionOutcome::Failed {
            error: "x".to_string(),
        });
        summary.record(&ExecutionOutcome::Skipped);
        summary.record(&ExecutionOutcome::Stuck {
            error: "db".to_string(),
        });

        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.stuck, 1);
        assert_eq!(summary.panicked, 0);
    }

    #[test]
    fn test_worker_event_clone() {
        let job_id = Uuid::new_v4();
        let event = WorkerEvent::JobCompleted {
            job_id,
            subject: "cat".to_string(),
            result_count: 3,
        };
        assert_eq!(event.clone(), event);
        assert!(format!("{:?}", event).contains("JobCompleted"));
    }
}
