//! Admission controller
//!
//! The scheduling loop. Each tick performs a bounded number of admission
//! attempts; each attempt admits at most one queued job into a tier with
//! spare capacity. Within a tier jobs start in submission order; a
//! saturated tier simply yields to the next candidate from any other tier.

use std::sync::Arc;
use std::time::Duration;

use strata_core::domain::job::JobStatus;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::TierTable;
use crate::scheduler::dispatch::Dispatcher;
use crate::scheduler::retry;
use crate::scheduler::slots::TierSlots;
use crate::store::{JobStore, StoreError};

pub struct AdmissionController {
    store: Arc<dyn JobStore>,
    dispatcher: Dispatcher,
    slots: Arc<TierSlots>,
    tiers: TierTable,
    attempts_per_tick: usize,
    interval: Duration,
    shutdown: CancellationToken,
}

impl AdmissionController {
    pub fn new(
        store: Arc<dyn JobStore>,
        dispatcher: Dispatcher,
        slots: Arc<TierSlots>,
        tiers: TierTable,
        attempts_per_tick: usize,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            dispatcher,
            slots,
            tiers,
            attempts_per_tick,
            interval,
            shutdown,
        }
    }

    /// Runs the admission loop until shutdown. Ticks never overlap: this is
    /// one task, and a tick completes before the next is taken.
    pub async fn run(&self) {
        info!(
            "admission loop started (interval {:?}, {} attempts per tick)",
            self.interval, self.attempts_per_tick
        );

        // Admitting against an empty slot table while the store still holds
        // running jobs would overshoot tier limits, so no tick runs until
        // recovery has succeeded.
        while let Err(e) = self.recover().await {
            error!("recovery of running jobs failed, retrying: {}", e);
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("admission loop stopped");
                    return;
                }
                _ = time::sleep(self.interval) => {}
            }
        }

        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("admission loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Rebuilds the slot table from jobs persisted as running and restarts
    /// their pollers. A running job without a backend handle has no
    /// execution to poll, so it goes through the failure path instead.
    pub async fn recover(&self) -> Result<(), StoreError> {
        let jobs = self.store.list().await?;

        for job in jobs {
            if job.status != JobStatus::Running {
                continue;
            }

            self.slots.occupy(job.tier, job.id);

            match &job.external_handle {
                Some(handle) => {
                    if let Err(e) = self.dispatcher.resume(&job, handle.reference.clone()) {
                        warn!("cannot resume polling for job {}: {}", job.id, e);
                        retry::handle_failure(
                            self.store.as_ref(),
                            &self.slots,
                            job.id,
                            &format!("poll resume failed: {}", e),
                        )
                        .await?;
                    } else {
                        info!("resumed polling for running job {}", job.id);
                    }
                }
                None => {
                    warn!("running job {} has no backend handle, retrying", job.id);
                    retry::handle_failure(
                        self.store.as_ref(),
                        &self.slots,
                        job.id,
                        "interrupted before dispatch completed",
                    )
                    .await?;
                }
            }
        }

        Ok(())
    }

    /// One scheduling tick: a bounded number of admission attempts. Stops
    /// early when no queued job can find capacity.
    pub async fn tick(&self) {
        for _ in 0..self.attempts_per_tick {
            match self.try_admit_one().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("admission attempt failed: {}", e);
                    break;
                }
            }
        }
    }

    /// A single admission attempt: scan queued jobs in submission order and
    /// start the first one whose tier has spare capacity. Returns false on
    /// a no-op attempt.
    async fn try_admit_one(&self) -> Result<bool, StoreError> {
        let queued = self.store.list_queued().await?;
        if queued.is_empty() {
            debug!("no queued jobs");
            return Ok(false);
        }

        for job in queued {
            let limit = self.tiers.limit(job.tier);

            // Reserve capacity first; the slot table is the single writer
            // for per-tier running counts.
            if !self.slots.try_admit(job.tier, limit, job.id) {
                debug!("tier {} saturated, skipping job {}", job.tier.as_str(), job.id);
                continue;
            }

            // Conditional store transition; loses if the job moved under us.
            if !self.store.mark_running(job.id).await? {
                self.slots.release(job.tier, job.id);
                continue;
            }

            info!(
                "job {} admitted (tier {}, retry {}/{})",
                job.id,
                job.tier.as_str(),
                job.retry_count,
                job.max_retries
            );

            if let Err(e) = self.dispatcher.dispatch(&job).await {
                // The job must not silently remain running without an
                // execution behind it.
                warn!("dispatch failed for job {}: {}", job.id, e);
                retry::handle_failure(
                    self.store.as_ref(),
                    &self.slots,
                    job.id,
                    &format!("dispatch failed: {}", e),
                )
                .await?;
            }

            return Ok(true);
        }

        Ok(false)
    }
}
