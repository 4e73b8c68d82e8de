//! Structured logging field name constants for menagerie.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Job stuck in processing, store failures, requires attention |
//! | WARN  | Skipped jobs, provider failures, recoverable anomalies |
//! | INFO  | Lifecycle events (startup, shutdown), job completions |
//! | DEBUG | Per-tick details, decision points |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "jobs", "db", "inference", "worker"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pipeline", "poller", "memory_store", "pg_store", "openai"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "execute", "claim", "generate", "classify"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Job UUID being processed.
pub const JOB_ID: &str = "job_id";

/// Subject chosen for the job.
pub const SUBJECT: &str = "subject";

/// Provider handling the request.
pub const PROVIDER: &str = "provider";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned.
pub const RESULT_COUNT: &str = "result_count";

/// Number of results requested.
pub const REQUESTED_COUNT: &str = "requested_count";

/// Number of jobs found in one poll.
pub const PENDING_COUNT: &str = "pending_count";
