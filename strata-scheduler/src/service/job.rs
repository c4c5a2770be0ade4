//! Job Service
//!
//! Submission and read logic. Validation failures surface synchronously to
//! the submitter; the job is never created. Priority and duration estimates
//! are computed exactly once, here.

use uuid::Uuid;

use strata_core::domain::job::Job;
use strata_core::dto::job::SubmitJob;
use strata_core::estimate;

use crate::config::Config;
use crate::store::{JobStore, StoreError};

/// Service error type
#[derive(Debug)]
pub enum JobError {
    NotFound(Uuid),
    ValidationError(String),
    StoreError(StoreError),
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        JobError::StoreError(err)
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::NotFound(id) => write!(f, "job {} not found", id),
            JobError::ValidationError(msg) => write!(f, "validation error: {}", msg),
            JobError::StoreError(err) => write!(f, "store error: {}", err),
        }
    }
}

/// Validate and persist a new analysis job as queued.
///
/// Returns immediately; admission, dispatch, and completion all happen in
/// the background scheduling loop.
pub async fn submit_job(
    store: &dyn JobStore,
    config: &Config,
    req: SubmitJob,
) -> Result<Job, JobError> {
    if req.owner_id.trim().is_empty() {
        return Err(JobError::ValidationError("owner_id cannot be empty".to_string()));
    }

    if !config.tiers.is_known(req.tier) {
        return Err(JobError::ValidationError(format!(
            "tier {} is not configured",
            req.tier.as_str()
        )));
    }

    let priority = estimate::priority(req.tier);
    let estimated = estimate::estimated_duration_minutes(req.job_type, &req.params);

    let job = Job::new(
        req.owner_id,
        req.tier,
        req.job_type,
        req.params,
        priority,
        estimated,
        config.default_max_retries,
    );

    store.create(&job).await?;

    tracing::info!(
        "Job submitted: {} (tier {}, type {}, est {}m)",
        job.id,
        job.tier.as_str(),
        job.job_type.as_str(),
        job.estimated_duration_minutes
    );

    Ok(job)
}

/// Get a job by ID
pub async fn get_job(store: &dyn JobStore, id: Uuid) -> Result<Job, JobError> {
    let job = store.get(id).await?.ok_or(JobError::NotFound(id))?;
    Ok(job)
}

/// List all jobs, newest first
pub async fn list_jobs(store: &dyn JobStore) -> Result<Vec<Job>, JobError> {
    let jobs = store.list().await?;
    Ok(jobs)
}

/// List queued jobs in submission order
pub async fn list_queued_jobs(store: &dyn JobStore) -> Result<Vec<Job>, JobError> {
    let jobs = store.list_queued().await?;
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_core::domain::job::{JobStatus, JobType};
    use strata_core::domain::tier::Tier;

    use crate::store::MemoryJobStore;

    fn submit_req() -> SubmitJob {
        let mut params = std::collections::HashMap::new();
        params.insert("batch_count".to_string(), json!(10));
        SubmitJob {
            owner_id: "owner-1".to_string(),
            tier: Tier::Professional,
            job_type: JobType::BulkScoring,
            params,
        }
    }

    #[tokio::test]
    async fn test_submit_persists_queued_job_with_estimates() {
        let store = MemoryJobStore::new();
        let config = Config::default();

        let job = submit_job(&store, &config, submit_req()).await.unwrap();

        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.priority, 3);
        assert_eq!(job.estimated_duration_minutes, 20);
        assert_eq!(job.max_retries, config.default_max_retries);

        let stored = store.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_owner() {
        let store = MemoryJobStore::new();
        let config = Config::default();
        let mut req = submit_req();
        req.owner_id = "  ".to_string();

        let err = submit_job(&store, &config, req).await.unwrap_err();
        assert!(matches!(err, JobError::ValidationError(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_job_is_not_found() {
        let store = MemoryJobStore::new();
        let err = get_job(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }
}
