//! API Module
//!
//! HTTP surface of the scheduler. Submission and read-only job snapshots;
//! all scheduling work happens in the background loops.

pub mod error;
pub mod health;
pub mod job;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::JobStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub config: Arc<Config>,
}

/// Create the main API router with all endpoints
pub fn create_router(store: Arc<dyn JobStore>, config: Arc<Config>) -> Router {
    let state = AppState { store, config };

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job endpoints
        .route("/job/submit", post(job::submit_job))
        .route("/job/list", get(job::list_jobs))
        .route("/job/list/queued", get(job::list_queued_jobs))
        .route("/job/{id}", get(job::get_job))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
