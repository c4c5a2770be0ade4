//! Postgres job store
//!
//! Handles all database operations related to jobs. Mirrors the migration
//! schema in `db.rs`; enum columns are stored as lowercase strings.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use strata_core::domain::backend::{BackendKind, ExternalHandle};
use strata_core::domain::job::{Job, JobStatus, JobType};
use strata_core::domain::tier::Tier;

use super::{JobStore, StoreError};

const JOB_COLUMNS: &str = "id, owner_id, tier, job_type, params, priority, \
     estimated_duration_minutes, status, progress_pct, retry_count, max_retries, \
     backend_kind, external_ref, result_uris, error_message, \
     created_at, started_at, completed_at, failed_at";

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, owner_id, tier, job_type, params, priority,
                              estimated_duration_minutes, status, progress_pct,
                              retry_count, max_retries, result_uris, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(job.id)
        .bind(&job.owner_id)
        .bind(job.tier.as_str())
        .bind(job.job_type.as_str())
        .bind(serde_json::to_value(&job.params).unwrap_or_default())
        .bind(job.priority)
        .bind(job.estimated_duration_minutes as i32)
        .bind(job.status.as_str())
        .bind(job.progress_pct as i16)
        .bind(job.retry_count as i32)
        .bind(job.max_retries as i32)
        .bind(&job.result_uris)
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_queued(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = 'queued' ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn count_running_by_tier(&self, tier: Tier) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE tier = $1 AND status = 'running'",
        )
        .bind(tier.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }

    async fn mark_running(&self, id: Uuid) -> Result<bool, StoreError> {
        // Conditional transition: loses cleanly if the job is not queued.
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'running', started_at = $2, progress_pct = 0
            WHERE id = $1 AND status = 'queued'
            "#,
        )
        .bind(id)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_dispatch(&self, id: Uuid, handle: &ExternalHandle) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET backend_kind = $2, external_ref = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(handle.backend_kind.as_str())
        .bind(&handle.reference)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn update_progress(&self, id: Uuid, pct: u8) -> Result<(), StoreError> {
        // GREATEST keeps progress monotonic even if a stale report lands late.
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET progress_pct = GREATEST(progress_pct, $2)
            WHERE id = $1 AND status = 'running'
            "#,
        )
        .bind(id)
        .bind(pct.min(100) as i16)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        result_uris: Vec<String>,
        warning: Option<String>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'completed', progress_pct = 100, result_uris = $2,
                error_message = $3, completed_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&result_uris)
        .bind(&warning)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn requeue(&self, id: Uuid, retry_count: u32, error: String) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'queued', retry_count = $2, error_message = $3,
                backend_kind = NULL, external_ref = NULL, progress_pct = 0,
                started_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(retry_count as i32)
        .bind(&error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        retry_count: u32,
        error: String,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'failed', retry_count = $2, error_message = $3, failed_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(retry_count as i32)
        .bind(&error)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    owner_id: String,
    tier: String,
    job_type: String,
    params: serde_json::Value,
    priority: i32,
    estimated_duration_minutes: i32,
    status: String,
    progress_pct: i16,
    retry_count: i32,
    max_retries: i32,
    backend_kind: Option<String>,
    external_ref: Option<String>,
    result_uris: Vec<String>,
    error_message: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    failed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        let external_handle = match (row.backend_kind.as_deref(), row.external_ref) {
            (Some(kind), Some(reference)) => BackendKind::parse(kind)
                .map(|backend_kind| ExternalHandle {
                    backend_kind,
                    reference,
                }),
            _ => None,
        };

        Job {
            id: row.id,
            owner_id: row.owner_id,
            tier: Tier::parse(&row.tier).unwrap_or(Tier::Basic),
            job_type: JobType::parse(&row.job_type).unwrap_or(JobType::QuickInsights),
            params: serde_json::from_value(row.params).unwrap_or_default(),
            priority: row.priority,
            estimated_duration_minutes: row.estimated_duration_minutes.max(0) as u32,
            status: JobStatus::parse(&row.status).unwrap_or(JobStatus::Queued),
            progress_pct: row.progress_pct.clamp(0, 100) as u8,
            retry_count: row.retry_count.max(0) as u32,
            max_retries: row.max_retries.max(0) as u32,
            external_handle,
            result_uris: row.result_uris,
            error_message: row.error_message,
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            failed_at: row.failed_at,
        }
    }
}
