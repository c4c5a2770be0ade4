//! Job API Handlers
//!
//! HTTP endpoints over the job service: submission and read-only snapshots.
//! Everything the scheduler does after submission is visible only through
//! these snapshots.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use strata_core::dto::job::{JobView, SubmitJob};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::job as job_service;

/// POST /job/submit
/// Validate and enqueue a new analysis job
pub async fn submit_job(
    State(state): State<AppState>,
    Json(req): Json<SubmitJob>,
) -> ApiResult<Json<JobView>> {
    tracing::info!("Submitting job for owner: {}", req.owner_id);

    let job = job_service::submit_job(state.store.as_ref(), &state.config, req).await?;

    Ok(Json(job.into()))
}

/// GET /job/{id}
/// Get a job snapshot by ID
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobView>> {
    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(state.store.as_ref(), id).await?;

    Ok(Json(job.into()))
}

/// GET /job/list
/// List all jobs, newest first
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobView>>> {
    tracing::debug!("Listing all jobs");

    let jobs = job_service::list_jobs(state.store.as_ref()).await?;

    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}

/// GET /job/list/queued
/// List queued jobs in submission order
pub async fn list_queued_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobView>>> {
    tracing::debug!("Listing queued jobs");

    let jobs = job_service::list_queued_jobs(state.store.as_ref()).await?;

    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}
