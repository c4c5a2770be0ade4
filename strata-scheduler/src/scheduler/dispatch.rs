//! Dispatcher
//!
//! Maps an admitted job to a backend adapter call: resolves the tier's
//! resource profile and the job type's adapter, submits, persists the
//! returned handle, and starts the status poller for the new execution.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use strata_core::domain::backend::ExternalHandle;
use strata_core::domain::job::{Job, JobType};

use crate::backend::{BackendError, BackendRegistry};
use crate::config::TierTable;
use crate::scheduler::poller::StatusPoller;
use crate::scheduler::slots::TierSlots;
use crate::store::{JobStore, StoreError};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no backend registered for job type {}", .0.as_str())]
    NoBackend(JobType),

    #[error("no resource profile configured for tier {0}")]
    NoProfile(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    registry: Arc<BackendRegistry>,
    tiers: TierTable,
    slots: Arc<TierSlots>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn JobStore>,
        registry: Arc<BackendRegistry>,
        tiers: TierTable,
        slots: Arc<TierSlots>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            registry,
            tiers,
            slots,
            poll_interval,
            shutdown,
        }
    }

    /// Submit an admitted job to its backend and start polling it.
    ///
    /// On error the job has no active execution; the caller routes it to
    /// the retry handler.
    pub async fn dispatch(&self, job: &Job) -> Result<(), DispatchError> {
        let backend = self
            .registry
            .resolve(job.job_type)
            .ok_or(DispatchError::NoBackend(job.job_type))?;

        let profile = self
            .tiers
            .profile(job.tier)
            .ok_or_else(|| DispatchError::NoProfile(job.tier.as_str().to_string()))?;

        let reference = backend.submit(job.id, &job.params, profile).await?;

        let handle = ExternalHandle {
            backend_kind: backend.kind(),
            reference: reference.clone(),
        };
        self.store.record_dispatch(job.id, &handle).await?;

        info!(
            "job {} dispatched to {} backend (ref {})",
            job.id,
            handle.backend_kind.as_str(),
            handle.reference
        );

        StatusPoller {
            job_id: job.id,
            tier: job.tier,
            reference,
            backend,
            store: self.store.clone(),
            slots: self.slots.clone(),
            interval: self.poll_interval,
            cancel: self.shutdown.child_token(),
        }
        .spawn();

        Ok(())
    }

    /// Restart polling for a job that already holds a backend handle.
    /// Used on startup to pick persisted in-flight executions back up.
    pub fn resume(&self, job: &Job, reference: String) -> Result<(), DispatchError> {
        let backend = self
            .registry
            .resolve(job.job_type)
            .ok_or(DispatchError::NoBackend(job.job_type))?;

        StatusPoller {
            job_id: job.id,
            tier: job.tier,
            reference,
            backend,
            store: self.store.clone(),
            slots: self.slots.clone(),
            interval: self.poll_interval,
            cancel: self.shutdown.child_token(),
        }
        .spawn();

        Ok(())
    }
}
