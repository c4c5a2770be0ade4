//! Job Record Store
//!
//! Persistence interface for job state. The scheduling core only mutates
//! status/progress/retry fields through the transition operations defined
//! here; it never owns storage itself.

pub mod memory;
pub mod postgres;

pub use memory::MemoryJobStore;
pub use postgres::PgJobStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use strata_core::domain::backend::ExternalHandle;
use strata_core::domain::job::Job;
use strata_core::domain::tier::Tier;

/// Errors surfaced by a job store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("job {0} not found")]
    NotFound(Uuid),
}

/// Durable storage for job records.
///
/// The queued -> running transition is a compare-and-set: `mark_running`
/// only applies if the job is still queued, so two concurrent admission
/// attempts can never both claim the same job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a freshly submitted job.
    async fn create(&self, job: &Job) -> Result<(), StoreError>;

    /// Fetch a single job.
    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// All jobs, newest first.
    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    /// Queued jobs in submission order (oldest first).
    async fn list_queued(&self) -> Result<Vec<Job>, StoreError>;

    /// Number of jobs currently running against the given tier.
    async fn count_running_by_tier(&self, tier: Tier) -> Result<usize, StoreError>;

    /// Conditional queued -> running transition; records `started_at`.
    /// Returns false when the job was no longer queued.
    async fn mark_running(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Persist the backend handle produced by a successful dispatch.
    async fn record_dispatch(&self, id: Uuid, handle: &ExternalHandle) -> Result<(), StoreError>;

    /// Advance progress for a running job. Progress never moves backwards;
    /// a stale report is ignored.
    async fn update_progress(&self, id: Uuid, pct: u8) -> Result<(), StoreError>;

    /// Terminal success: progress 100, result uris recorded. `warning` is
    /// set when results could not be retrieved.
    async fn mark_completed(
        &self,
        id: Uuid,
        result_uris: Vec<String>,
        warning: Option<String>,
    ) -> Result<(), StoreError>;

    /// Recycle a job for another attempt: back to queued with the handle
    /// cleared and the failure annotated.
    async fn requeue(&self, id: Uuid, retry_count: u32, error: String) -> Result<(), StoreError>;

    /// Terminal failure after the retry budget is exhausted.
    async fn mark_failed(&self, id: Uuid, retry_count: u32, error: String)
    -> Result<(), StoreError>;
}
