//! Status poller
//!
//! One poller per in-flight job, created at dispatch and destroyed on the
//! first terminal observation. The task is bound to a cancellation token so
//! shutdown never leaks a timer; a terminal transition exits the loop
//! deterministically.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use strata_core::domain::backend::BackendStatus;
use strata_core::domain::tier::Tier;

use crate::backend::ComputeBackend;
use crate::scheduler::retry;
use crate::scheduler::slots::TierSlots;
use crate::store::JobStore;

/// Progress placeholder while the backend is still starting up.
const STARTING_PROGRESS: u8 = 10;
/// Progress placeholder when the backend reports none of its own.
const IN_PROGRESS_FALLBACK: u8 = 50;

pub struct StatusPoller {
    pub job_id: Uuid,
    pub tier: Tier,
    pub reference: String,
    pub backend: Arc<dyn ComputeBackend>,
    pub store: Arc<dyn JobStore>,
    pub slots: Arc<TierSlots>,
    pub interval: Duration,
    pub cancel: CancellationToken,
}

enum PollOutcome {
    Continue,
    Terminal,
}

impl StatusPoller {
    /// Spawns the poll loop for one in-flight job.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        debug!(
            "poller started for job {} ({} backend, ref {})",
            self.job_id,
            self.backend.kind().as_str(),
            self.reference
        );

        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("poller for job {} cancelled", self.job_id);
                    self.slots.release(self.tier, self.job_id);
                    break;
                }
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        PollOutcome::Continue => {}
                        PollOutcome::Terminal => break,
                    }
                }
            }
        }
    }

    async fn poll_once(&self) -> PollOutcome {
        let poll = match self.backend.poll_status(&self.reference).await {
            Ok(poll) => poll,
            Err(e) => {
                // Transient: never counted against the retry budget.
                warn!("poll for job {} errored, will retry next tick: {}", self.job_id, e);
                return PollOutcome::Continue;
            }
        };

        match poll.status {
            BackendStatus::Starting => {
                self.record_progress(STARTING_PROGRESS).await;
                PollOutcome::Continue
            }
            BackendStatus::InProgress => {
                self.record_progress(poll.progress.unwrap_or(IN_PROGRESS_FALLBACK))
                    .await;
                PollOutcome::Continue
            }
            BackendStatus::Completed => {
                self.finish_completed().await;
                self.slots.release(self.tier, self.job_id);
                PollOutcome::Terminal
            }
            BackendStatus::Failed => {
                // The retry handler releases the slot itself; once it has,
                // the freed capacity may already belong to a re-admitted
                // attempt, so this task must not touch the slot again.
                let cause = poll
                    .error
                    .unwrap_or_else(|| "backend reported failure".to_string());
                if let Err(e) =
                    retry::handle_failure(self.store.as_ref(), &self.slots, self.job_id, &cause)
                        .await
                {
                    error!("failed to record failure for job {}: {}", self.job_id, e);
                }
                PollOutcome::Terminal
            }
        }
    }

    async fn record_progress(&self, pct: u8) {
        if let Err(e) = self.store.update_progress(self.job_id, pct).await {
            error!("failed to update progress for job {}: {}", self.job_id, e);
        }
    }

    async fn finish_completed(&self) {
        match self.backend.fetch_results(&self.reference).await {
            Ok(uris) => {
                info!("job {} completed with {} result(s)", self.job_id, uris.len());
                if let Err(e) = self.store.mark_completed(self.job_id, uris, None).await {
                    error!("failed to mark job {} completed: {}", self.job_id, e);
                }
            }
            Err(e) => {
                // A completed job with no retrievable output is still completed.
                warn!("results unavailable for completed job {}: {}", self.job_id, e);
                let warning = format!("results unavailable: {}", e);
                if let Err(e) = self
                    .store
                    .mark_completed(self.job_id, Vec::new(), Some(warning))
                    .await
                {
                    error!("failed to mark job {} completed: {}", self.job_id, e);
                }
            }
        }
    }
}
