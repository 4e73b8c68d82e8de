//! menagerie worker service.
//!
//! Wires the job store, the generation provider, and the polling worker
//! together, then runs until interrupted.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menagerie_db::{create_pool, run_migrations, InMemoryJobStore, JobStore, PgJobStore};
use menagerie_inference::build_provider;
use menagerie_jobs::{GenerationService, JobStatus, JobWorker, WorkerEvent};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "menagerie=info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "menagerie_worker=info,menagerie_jobs=info,menagerie_db=info,menagerie_inference=info"
            .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("menagerie-worker.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = AppConfig::from_env()?;

    let store: Arc<dyn JobStore> = match config.database_url {
        Some(ref database_url) => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            info!(subsystem = "worker", "Using PostgreSQL job store");
            Arc::new(PgJobStore::new(pool))
        }
        None => {
            warn!(
                subsystem = "worker",
                "DATABASE_URL not set, using an in-memory store that only this process \
                 can submit to; the worker will idle"
            );
            Arc::new(InMemoryJobStore::new())
        }
    };

    let provider = build_provider(&config.provider)?;
    info!(
        subsystem = "worker",
        provider = provider.name(),
        min_images = config.bounds.min(),
        max_images = config.bounds.max(),
        "Generation provider ready"
    );

    let service = GenerationService::new(store.clone(), provider.clone(), config.bounds);
    let backlog = service.list_jobs().await?;
    info!(
        subsystem = "worker",
        total_jobs = backlog.len(),
        pending_jobs = backlog
            .iter()
            .filter(|job| job.status == JobStatus::Pending)
            .count(),
        stuck_jobs = backlog
            .iter()
            .filter(|job| job.status == JobStatus::Processing)
            .count(),
        "Job backlog at startup"
    );

    let worker = Arc::new(JobWorker::new(store, provider, config.worker.clone()));

    let mut events = worker.events();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(WorkerEvent::JobStuck { job_id, error }) => {
                    error!(subsystem = "worker", %job_id, %error, "Job stuck in processing");
                }
                Ok(event) => debug!(subsystem = "worker", ?event, "Worker event"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(subsystem = "worker", skipped, "Worker event log lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    worker.start();

    tokio::signal::ctrl_c().await?;
    info!(subsystem = "worker", "Shutdown requested, waiting for in-flight jobs");

    worker.stop().await;
    event_logger.abort();

    info!(subsystem = "worker", "Shutdown complete");
    Ok(())
}
