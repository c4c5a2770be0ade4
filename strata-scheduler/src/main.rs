//! Strata Scheduler binary
//!
//! Wires configuration, the Postgres job store, the backend registry, the
//! scheduling loops, and the HTTP surface together.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_core::domain::backend::BackendKind;
use strata_core::domain::job::JobType;

use strata_scheduler::api;
use strata_scheduler::backend::{BackendRegistry, HttpBackend};
use strata_scheduler::config::Config;
use strata_scheduler::db;
use strata_scheduler::scheduler::Scheduler;
use strata_scheduler::store::{JobStore, PgJobStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strata_scheduler=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Strata Scheduler...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store: Arc<dyn JobStore> = Arc::new(PgJobStore::new(pool));

    let registry = Arc::new(build_registry(&config));
    let config = Arc::new(config);

    // Background scheduling: admission loop plus one poller per running job
    let scheduler = Scheduler::new(store.clone(), registry, &config);
    let _admission_handle = scheduler.start();

    // HTTP surface
    let app = api::create_router(store, config.clone());

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    scheduler.shutdown();
    Ok(())
}

/// One HTTP adapter per backend style, mapped to every job type that runs
/// on it.
fn build_registry(config: &Config) -> BackendRegistry {
    let training = Arc::new(HttpBackend::new(
        BackendKind::Training,
        config.backends.training_url.clone(),
    ));
    let batch = Arc::new(HttpBackend::new(
        BackendKind::Batch,
        config.backends.batch_url.clone(),
    ));
    let function = Arc::new(HttpBackend::new(
        BackendKind::Function,
        config.backends.function_url.clone(),
    ));

    let mut registry = BackendRegistry::new();
    for job_type in JobType::all() {
        match job_type.backend_kind() {
            BackendKind::Training => registry.register(job_type, training.clone()),
            BackendKind::Batch => registry.register(job_type, batch.clone()),
            BackendKind::Function => registry.register(job_type, function.clone()),
        }
    }
    debug_assert!(registry.is_complete());

    registry
}
