//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::backend::{BackendKind, ExternalHandle};
use crate::domain::tier::Tier;

/// Analysis job record
///
/// Structure shared between the persistence layer (stores it) and the
/// scheduling core (admits, dispatches, and polls it). Status and retry
/// fields are only mutated through the transition helpers below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub owner_id: String,
    pub tier: Tier,
    pub job_type: JobType,
    pub params: std::collections::HashMap<String, serde_json::Value>,
    /// Informational ordinal derived once from the tier; not a scheduling key
    pub priority: i32,
    pub estimated_duration_minutes: u32,
    pub status: JobStatus,
    pub progress_pct: u8,
    pub retry_count: u32,
    pub max_retries: u32,
    pub external_handle: Option<ExternalHandle>,
    pub result_uris: Vec<String>,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub failed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// Kind of analysis a job performs. Each kind maps to exactly one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    ModelTraining,
    BulkScoring,
    QuickInsights,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::ModelTraining => "model_training",
            JobType::BulkScoring => "bulk_scoring",
            JobType::QuickInsights => "quick_insights",
        }
    }

    pub fn parse(s: &str) -> Option<JobType> {
        match s {
            "model_training" => Some(JobType::ModelTraining),
            "bulk_scoring" => Some(JobType::BulkScoring),
            "quick_insights" => Some(JobType::QuickInsights),
            _ => None,
        }
    }

    /// The execution technology this kind of work runs on.
    pub fn backend_kind(&self) -> BackendKind {
        match self {
            JobType::ModelTraining => BackendKind::Training,
            JobType::BulkScoring => BackendKind::Batch,
            JobType::QuickInsights => BackendKind::Function,
        }
    }

    pub fn all() -> [JobType; 3] {
        [JobType::ModelTraining, JobType::BulkScoring, JobType::QuickInsights]
    }
}

impl Job {
    /// Creates a freshly submitted job in the queued state.
    pub fn new(
        owner_id: String,
        tier: Tier,
        job_type: JobType,
        params: std::collections::HashMap<String, serde_json::Value>,
        priority: i32,
        estimated_duration_minutes: u32,
        max_retries: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            tier,
            job_type,
            params,
            priority,
            estimated_duration_minutes,
            status: JobStatus::Queued,
            progress_pct: 0,
            retry_count: 0,
            max_retries,
            external_handle: None,
            result_uris: Vec::new(),
            error_message: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            failed_at: None,
        }
    }

    /// Admission: queued -> running.
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.progress_pct = 0;
        self.started_at = Some(chrono::Utc::now());
    }

    /// Records the backend reference after a successful dispatch.
    pub fn attach_handle(&mut self, handle: ExternalHandle) {
        self.external_handle = Some(handle);
    }

    /// Progress only moves forward while running; stale reports are ignored.
    pub fn advance_progress(&mut self, pct: u8) {
        if self.status == JobStatus::Running && pct > self.progress_pct {
            self.progress_pct = pct.min(100);
        }
    }

    /// Terminal success. An empty uri list is allowed (results unretrievable).
    pub fn complete(&mut self, result_uris: Vec<String>, warning: Option<String>) {
        self.status = JobStatus::Completed;
        self.progress_pct = 100;
        self.result_uris = result_uris;
        self.error_message = warning;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// Recycle for another attempt: back to queued, handle cleared.
    pub fn requeue(&mut self, retry_count: u32, error: String) {
        self.status = JobStatus::Queued;
        self.retry_count = retry_count;
        self.error_message = Some(error);
        self.external_handle = None;
        self.progress_pct = 0;
        self.started_at = None;
    }

    /// Terminal failure after retries are exhausted.
    pub fn fail(&mut self, retry_count: u32, error: String) {
        self.status = JobStatus::Failed;
        self.retry_count = retry_count;
        self.error_message = Some(error);
        self.failed_at = Some(chrono::Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> Job {
        let mut params = std::collections::HashMap::new();
        params.insert("dataset_rows".to_string(), json!(5000));
        Job::new(
            "owner-1".to_string(),
            Tier::Advanced,
            JobType::ModelTraining,
            params,
            2,
            15,
            3,
        )
    }

    #[test]
    fn test_new_job_is_queued() {
        let j = job();
        assert_eq!(j.status, JobStatus::Queued);
        assert_eq!(j.progress_pct, 0);
        assert_eq!(j.retry_count, 0);
        assert!(j.external_handle.is_none());
        assert!(!j.is_terminal());
    }

    #[test]
    fn test_lifecycle_success() {
        let mut j = job();
        j.start();
        assert_eq!(j.status, JobStatus::Running);
        assert!(j.started_at.is_some());

        j.advance_progress(10);
        j.advance_progress(50);
        assert_eq!(j.progress_pct, 50);

        j.complete(vec!["s3://results/a".to_string()], None);
        assert_eq!(j.status, JobStatus::Completed);
        assert_eq!(j.progress_pct, 100);
        assert!(j.is_terminal());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut j = job();
        j.start();
        j.advance_progress(50);
        j.advance_progress(10);
        assert_eq!(j.progress_pct, 50);
    }

    #[test]
    fn test_progress_ignored_unless_running() {
        let mut j = job();
        j.advance_progress(50);
        assert_eq!(j.progress_pct, 0);
    }

    #[test]
    fn test_requeue_clears_execution_state() {
        let mut j = job();
        j.start();
        j.attach_handle(ExternalHandle {
            backend_kind: BackendKind::Training,
            reference: "ext-1".to_string(),
        });
        j.advance_progress(50);

        j.requeue(1, "attempt 1 failed: backend error".to_string());
        assert_eq!(j.status, JobStatus::Queued);
        assert_eq!(j.retry_count, 1);
        assert!(j.external_handle.is_none());
        assert_eq!(j.progress_pct, 0);
        assert!(j.started_at.is_none());
    }

    #[test]
    fn test_job_type_backend_mapping() {
        assert_eq!(JobType::ModelTraining.backend_kind(), BackendKind::Training);
        assert_eq!(JobType::BulkScoring.backend_kind(), BackendKind::Batch);
        assert_eq!(JobType::QuickInsights.backend_kind(), BackendKind::Function);
    }
}
