//! # menagerie-jobs
//!
//! Asynchronous image generation jobs for menagerie.
//!
//! This crate provides:
//! - The per-job execution pipeline (claim, pick subject, generate, persist)
//! - A polling worker with bounded concurrent dispatch
//! - Lifecycle notifications via a broadcast channel
//! - `GenerationService`, the facade a request layer calls
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use menagerie_db::InMemoryJobStore;
//! use menagerie_inference::MockProvider;
//! use menagerie_jobs::{GenerationService, JobBounds, JobWorker, WorkerConfig};
//!
//! let store = Arc::new(InMemoryJobStore::new());
//! let provider = Arc::new(MockProvider::new());
//!
//! let service = GenerationService::new(store.clone(), provider.clone(), JobBounds::default());
//! let worker = Arc::new(JobWorker::new(store, provider, WorkerConfig::default()));
//!
//! worker.start();
//! let job = service.create_job(3).await?;
//!
//! let mut events = worker.events();
//! while let Ok(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//!
//! worker.stop().await;
//! ```

pub mod catalog;
pub mod pipeline;
pub mod service;
pub mod worker;

// Re-export core types
pub use menagerie_core::*;

pub use catalog::{build_prompt, SubjectCatalog, ANIMALS};
pub use pipeline::{ExecutionOutcome, JobExecutor, GENERATION_FAILED};
pub use service::{GenerationService, JobBounds};
pub use worker::{JobWorker, TickSummary, WorkerConfig, WorkerEvent};

/// Default polling interval for job discovery (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = menagerie_core::defaults::JOB_POLL_INTERVAL_MS;
