//! Job DTOs for the submission and read surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::{Job, JobStatus, JobType};
use crate::domain::tier::Tier;

/// Request to submit a new analysis job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJob {
    pub owner_id: String,
    pub tier: Tier,
    pub job_type: JobType,
    #[serde(default)]
    pub params: std::collections::HashMap<String, serde_json::Value>,
}

/// Read-only job snapshot returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobView {
    pub id: Uuid,
    pub owner_id: String,
    pub tier: Tier,
    pub job_type: JobType,
    pub status: JobStatus,
    pub priority: i32,
    pub estimated_duration_minutes: u32,
    pub progress_pct: u8,
    pub retry_count: u32,
    pub max_retries: u32,
    pub result_uris: Vec<String>,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub failed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            owner_id: job.owner_id,
            tier: job.tier,
            job_type: job.job_type,
            status: job.status,
            priority: job.priority,
            estimated_duration_minutes: job.estimated_duration_minutes,
            progress_pct: job.progress_pct,
            retry_count: job.retry_count,
            max_retries: job.max_retries,
            result_uris: job.result_uris,
            error_message: job.error_message,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            failed_at: job.failed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_view_conversion() {
        let job = Job::new(
            "owner-1".to_string(),
            Tier::Basic,
            JobType::QuickInsights,
            Default::default(),
            1,
            5,
            3,
        );
        let view: JobView = job.clone().into();
        assert_eq!(view.id, job.id);
        assert_eq!(view.status, JobStatus::Queued);
        assert_eq!(view.estimated_duration_minutes, 5);
    }

    #[test]
    fn test_submit_job_params_default() {
        let req: SubmitJob = serde_json::from_str(
            r#"{"owner_id":"o","tier":"basic","job_type":"quick_insights"}"#,
        )
        .unwrap();
        assert!(req.params.is_empty());
    }
}
