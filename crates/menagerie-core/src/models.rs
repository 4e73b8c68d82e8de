//! Core data models for menagerie.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// JOB STATUS
// =============================================================================

/// Status of a generation job.
///
/// Transitions are monotonic: `Pending -> Processing -> {Completed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position in the lifecycle. Both terminal states share the last rank.
    pub fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether a job in this status may move to `next`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(Error::Serialization(format!(
                "unknown job status: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// JOB
// =============================================================================

/// A single image generation request and its lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub requested_count: i32,
    /// Chosen by the execution pipeline, never by the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// URLs or inline `data:` payloads. Present only when completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<String>>,
    /// Present only when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new pending job with a fresh time-ordered id.
    pub fn new(requested_count: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            status: JobStatus::Pending,
            requested_count,
            subject: None,
            results: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a partial update as one unit.
    ///
    /// Leaves the job untouched when the update would break the state machine.
    pub fn apply(&mut self, update: JobUpdate) -> Result<()> {
        update.check_against(self.status)?;

        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(subject) = update.subject {
            self.subject = Some(subject);
        }
        if let Some(results) = update.results {
            self.results = Some(results);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
        self.updated_at = Utc::now().max(self.updated_at);
        Ok(())
    }
}

// =============================================================================
// PARTIAL UPDATES
// =============================================================================

/// Field set applied atomically by `JobStore::update`.
///
/// `None` leaves the stored field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub subject: Option<String>,
    pub results: Option<Vec<String>>,
    pub error: Option<String>,
}

impl JobUpdate {
    /// Mark a job as picked up for execution.
    pub fn processing() -> Self {
        Self {
            status: Some(JobStatus::Processing),
            ..Self::default()
        }
    }

    /// Mark a job as completed with the provider's results.
    pub fn completed(subject: impl Into<String>, results: Vec<String>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            subject: Some(subject.into()),
            results: Some(results),
            error: None,
        }
    }

    /// Mark a job as failed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Validate this update against the job's current status.
    ///
    /// Updates without a status change are only accepted on non-terminal jobs.
    pub fn check_against(&self, current: JobStatus) -> Result<()> {
        match self.status {
            Some(next) if !current.can_transition_to(next) => Err(Error::InvalidTransition {
                from: current,
                to: next,
            }),
            None if current.is_terminal() => Err(Error::InvalidTransition {
                from: current,
                to: current,
            }),
            _ => Ok(()),
        }
    }

    /// Statuses a job may be in for this update to apply.
    pub fn source_statuses(&self) -> Vec<JobStatus> {
        JobStatus::ALL
            .into_iter()
            .filter(|current| self.check_against(*current).is_ok())
            .collect()
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Animals recognised in an image.
///
/// Failures are reported in-band through `error` with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub animals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Classification {
    pub fn found(animals: Vec<String>) -> Self {
        Self {
            animals,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            animals: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending_and_empty() {
        let job = Job::new(3);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.requested_count, 3);
        assert!(job.subject.is_none());
        assert!(job.results.is_none());
        assert!(job.error.is_none());
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn test_new_job_ids_are_unique() {
        let a = Job::new(1);
        let b = Job::new(1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("running".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }

    #[test]
    fn test_transitions_follow_lifecycle() {
        use JobStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Processing.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Pending));
        for terminal in [Completed, Failed] {
            for next in JobStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_allowed_transitions_never_regress() {
        for from in JobStatus::ALL {
            for to in JobStatus::ALL {
                if from.can_transition_to(to) {
                    assert!(to.rank() > from.rank());
                }
            }
        }
    }

    #[test]
    fn test_apply_completed_sets_subject_and_results() {
        let mut job = Job::new(2);
        job.apply(JobUpdate::processing()).unwrap();
        job.apply(JobUpdate::completed(
            "owl",
            vec!["u1".to_string(), "u2".to_string()],
        ))
        .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.subject.as_deref(), Some("owl"));
        assert_eq!(job.results.as_ref().map(Vec::len), Some(2));
        assert!(job.error.is_none());
        assert!(job.updated_at >= job.created_at);
    }

    #[test]
    fn test_apply_failed_sets_error_only() {
        let mut job = Job::new(2);
        job.apply(JobUpdate::processing()).unwrap();
        job.apply(JobUpdate::failed("rate limited")).unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("rate limited"));
        assert!(job.results.is_none());
    }

    #[test]
    fn test_apply_rejects_leaving_terminal_state() {
        let mut job = Job::new(1);
        job.apply(JobUpdate::processing()).unwrap();
        job.apply(JobUpdate::failed("boom")).unwrap();
        let before = job.clone();

        let err = job.apply(JobUpdate::processing()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: JobStatus::Failed,
                to: JobStatus::Processing
            }
        ));
        assert_eq!(job, before);
    }

    #[test]
    fn test_field_only_update_rejected_on_terminal_job() {
        let update = JobUpdate {
            subject: Some("cat".to_string()),
            ..JobUpdate::default()
        };
        assert!(update.check_against(JobStatus::Processing).is_ok());
        assert!(update.check_against(JobStatus::Completed).is_err());
    }

    #[test]
    fn test_source_statuses() {
        assert_eq!(
            JobUpdate::processing().source_statuses(),
            vec![JobStatus::Pending]
        );
        assert_eq!(
            JobUpdate::failed("x").source_statuses(),
            vec![JobStatus::Processing]
        );
        assert_eq!(
            JobUpdate::default().source_statuses(),
            vec![JobStatus::Pending, JobStatus::Processing]
        );
    }

    #[test]
    fn test_job_serializes_camel_case_and_skips_absent_fields() {
        let job = Job::new(3);
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["requestedCount"], 3);
        assert_eq!(value["status"], "pending");
        assert!(value.get("results").is_none());
        assert!(value.get("error").is_none());
        assert!(value.get("subject").is_none());
    }

    #[test]
    fn test_classification_constructors() {
        let ok = Classification::found(vec!["cat".to_string()]);
        assert!(ok.error.is_none());
        let failed = Classification::failed("No animals detected in the image");
        assert!(failed.animals.is_empty());
        assert_eq!(
            failed.error.as_deref(),
            Some("No animals detected in the image")
        );
    }
}
