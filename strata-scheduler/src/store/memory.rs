//! In-memory job store
//!
//! Backs tests and local development. State transitions reuse the domain
//! helpers so both store implementations share the same semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use strata_core::domain::backend::ExternalHandle;
use strata_core::domain::job::{Job, JobStatus};
use strata_core::domain::tier::Tier;

use super::{JobStore, StoreError};

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn list_queued(&self) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.status == JobStatus::Queued)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(jobs)
    }

    async fn count_running_by_tier(&self, tier: Tier) -> Result<usize, StoreError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.tier == tier && j.status == JobStatus::Running)
            .count())
    }

    async fn mark_running(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Queued => {
                job.start();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_dispatch(&self, id: Uuid, handle: &ExternalHandle) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.attach_handle(handle.clone());
        Ok(())
    }

    async fn update_progress(&self, id: Uuid, pct: u8) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.advance_progress(pct);
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        result_uris: Vec<String>,
        warning: Option<String>,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.complete(result_uris, warning);
        Ok(())
    }

    async fn requeue(&self, id: Uuid, retry_count: u32, error: String) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.requeue(retry_count, error);
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        retry_count: u32,
        error: String,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.fail(retry_count, error);
        Ok(())
    }
}
