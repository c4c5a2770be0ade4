//! Compute backend adapters
//!
//! An adapter fronts one external execution technology and exposes the
//! submit / poll-status / fetch-results contract the scheduling core is
//! written against. Adapters are looked up through a registry keyed by job
//! type, populated once at startup; adding a job type never touches the
//! scheduler's control flow.

pub mod http;

pub use http::HttpBackend;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use strata_core::domain::backend::{BackendKind, BackendStatus};
use strata_core::domain::job::JobType;
use strata_core::domain::tier::ResourceProfile;

/// Errors surfaced by a backend adapter
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend rejected the call (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to parse backend response: {0}")]
    Parse(String),
}

/// One status report from a backend.
#[derive(Debug, Clone)]
pub struct BackendPoll {
    pub status: BackendStatus,
    /// Adapter-reported progress, when the backend exposes one
    pub progress: Option<u8>,
    /// Failure reason, set when `status` is failed
    pub error: Option<String>,
}

/// Abstraction over a specific external execution technology.
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    /// Which technology this adapter fronts.
    fn kind(&self) -> BackendKind;

    /// Start an execution; returns the backend's opaque reference.
    async fn submit(
        &self,
        job_id: Uuid,
        params: &HashMap<String, serde_json::Value>,
        profile: &ResourceProfile,
    ) -> Result<String, BackendError>;

    /// Report the current status of an in-flight execution.
    async fn poll_status(&self, reference: &str) -> Result<BackendPoll, BackendError>;

    /// Retrieve result locators for a completed execution.
    async fn fetch_results(&self, reference: &str) -> Result<Vec<String>, BackendError>;
}

/// `job type -> adapter` table, populated at startup.
#[derive(Default)]
pub struct BackendRegistry {
    adapters: HashMap<JobType, Arc<dyn ComputeBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job_type: JobType, adapter: Arc<dyn ComputeBackend>) {
        self.adapters.insert(job_type, adapter);
    }

    pub fn resolve(&self, job_type: JobType) -> Option<Arc<dyn ComputeBackend>> {
        self.adapters.get(&job_type).cloned()
    }

    /// True when every job type has an adapter. Checked once at startup.
    pub fn is_complete(&self) -> bool {
        JobType::all()
            .iter()
            .all(|jt| self.adapters.contains_key(jt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullBackend(BackendKind);

    #[async_trait]
    impl ComputeBackend for NullBackend {
        fn kind(&self) -> BackendKind {
            self.0
        }

        async fn submit(
            &self,
            _job_id: Uuid,
            _params: &HashMap<String, serde_json::Value>,
            _profile: &ResourceProfile,
        ) -> Result<String, BackendError> {
            Ok("ref".to_string())
        }

        async fn poll_status(&self, _reference: &str) -> Result<BackendPoll, BackendError> {
            Ok(BackendPoll {
                status: BackendStatus::Starting,
                progress: None,
                error: None,
            })
        }

        async fn fetch_results(&self, _reference: &str) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_registry_resolution() {
        let mut registry = BackendRegistry::new();
        registry.register(
            JobType::ModelTraining,
            Arc::new(NullBackend(BackendKind::Training)),
        );

        assert!(registry.resolve(JobType::ModelTraining).is_some());
        assert!(registry.resolve(JobType::BulkScoring).is_none());
        assert!(!registry.is_complete());

        registry.register(JobType::BulkScoring, Arc::new(NullBackend(BackendKind::Batch)));
        registry.register(
            JobType::QuickInsights,
            Arc::new(NullBackend(BackendKind::Function)),
        );
        assert!(registry.is_complete());
    }
}
