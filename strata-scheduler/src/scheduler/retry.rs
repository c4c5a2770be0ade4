//! Retry/Failure handling
//!
//! The single path a running job takes back to queued. Invoked on dispatch
//! failure and on terminal backend failure; bounds the number of attempts a
//! job makes before it is permanently failed.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::scheduler::slots::TierSlots;
use crate::store::{JobStore, StoreError};

/// Record a failure event for the job and either recycle it to queued or
/// fail it terminally once the retry budget is spent.
///
/// Estimates are not recomputed; a requeued job is indistinguishable from a
/// fresh submission to the admission loop.
pub async fn handle_failure(
    store: &dyn JobStore,
    slots: &TierSlots,
    job_id: Uuid,
    cause: &str,
) -> Result<(), StoreError> {
    let Some(job) = store.get(job_id).await? else {
        warn!("failure reported for unknown job {}", job_id);
        return Ok(());
    };

    // The job is no longer occupying tier capacity either way.
    slots.release(job.tier, job_id);

    let attempt = job.retry_count + 1;
    if attempt < job.max_retries {
        store
            .requeue(
                job_id,
                attempt,
                format!("attempt {} failed: {}", attempt, cause),
            )
            .await?;
        info!(
            "job {} requeued for retry {}/{}: {}",
            job_id, attempt, job.max_retries, cause
        );
    } else {
        let retry_count = attempt.min(job.max_retries);
        store.mark_failed(job_id, retry_count, cause.to_string()).await?;
        error!(
            "job {} failed terminally after {} attempts: {}",
            job_id, attempt, cause
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::domain::job::{Job, JobStatus, JobType};
    use strata_core::domain::tier::Tier;

    use crate::store::MemoryJobStore;

    fn job(max_retries: u32) -> Job {
        Job::new(
            "owner-1".to_string(),
            Tier::Basic,
            JobType::QuickInsights,
            Default::default(),
            1,
            5,
            max_retries,
        )
    }

    #[tokio::test]
    async fn test_failure_requeues_below_budget() {
        let store = MemoryJobStore::new();
        let slots = TierSlots::new();
        let j = job(3);
        let id = j.id;
        store.create(&j).await.unwrap();
        store.mark_running(id).await.unwrap();
        assert!(slots.try_admit(Tier::Basic, 1, id));

        handle_failure(&store, &slots, id, "backend exploded")
            .await
            .unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Queued);
        assert_eq!(stored.retry_count, 1);
        assert!(
            stored
                .error_message
                .as_deref()
                .unwrap()
                .contains("attempt 1 failed")
        );
        assert_eq!(slots.running_count(Tier::Basic), 0);
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion_is_terminal() {
        let store = MemoryJobStore::new();
        let slots = TierSlots::new();
        let j = job(3);
        let id = j.id;
        store.create(&j).await.unwrap();

        for _ in 0..3 {
            store.mark_running(id).await.unwrap();
            handle_failure(&store, &slots, id, "backend exploded")
                .await
                .unwrap();
        }

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(stored.retry_count, 3);
        assert!(stored.failed_at.is_some());
        assert_eq!(stored.error_message.as_deref(), Some("backend exploded"));
    }

    #[tokio::test]
    async fn test_unknown_job_is_ignored() {
        let store = MemoryJobStore::new();
        let slots = TierSlots::new();
        handle_failure(&store, &slots, Uuid::new_v4(), "whatever")
            .await
            .unwrap();
    }
}
