//! Scheduling core
//!
//! Admission loop, dispatcher, per-job status pollers, and the bounded
//! retry handler, assembled over a job store and a backend registry.

pub mod admission;
pub mod dispatch;
pub mod poller;
pub mod retry;
pub mod slots;

pub use admission::AdmissionController;
pub use dispatch::{DispatchError, Dispatcher};
pub use poller::StatusPoller;
pub use slots::TierSlots;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::BackendRegistry;
use crate::config::Config;
use crate::store::JobStore;

/// Assembled scheduler: wires the slot table, dispatcher, and admission
/// controller together and owns the shutdown token every poller task is
/// parented to.
pub struct Scheduler {
    controller: Arc<AdmissionController>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn JobStore>,
        registry: Arc<BackendRegistry>,
        config: &Config,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let slots = Arc::new(TierSlots::new());

        let dispatcher = Dispatcher::new(
            store.clone(),
            registry,
            config.tiers.clone(),
            slots.clone(),
            config.poll_interval,
            shutdown.clone(),
        );

        let controller = Arc::new(AdmissionController::new(
            store,
            dispatcher,
            slots,
            config.tiers.clone(),
            config.admission_attempts,
            config.admission_interval,
            shutdown.clone(),
        ));

        Self {
            controller,
            shutdown,
        }
    }

    /// Starts the admission loop task.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.run().await })
    }

    /// Direct access to the controller, used to drive ticks in tests.
    pub fn controller(&self) -> &AdmissionController {
        &self.controller
    }

    /// Cancels the admission loop and every active poller.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
