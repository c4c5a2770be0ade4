//! Backend reference types
//!
//! Shared vocabulary between the dispatcher, the status poller, and the job
//! record: which execution technology a job went to, the opaque reference it
//! returned, and the canonical status a backend report is mapped onto.

use serde::{Deserialize, Serialize};

/// The execution technology an adapter fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Long-running training-job style executions
    Training,
    /// Batch-job style executions
    Batch,
    /// Short function-invocation style executions
    Function,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Training => "training",
            BackendKind::Batch => "batch",
            BackendKind::Function => "function",
        }
    }

    pub fn parse(s: &str) -> Option<BackendKind> {
        match s {
            "training" => Some(BackendKind::Training),
            "batch" => Some(BackendKind::Batch),
            "function" => Some(BackendKind::Function),
            _ => None,
        }
    }
}

/// Opaque reference to an in-flight execution on a specific backend.
///
/// The kind tag is persisted alongside the reference because polling later
/// needs to know which adapter to call back into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalHandle {
    pub backend_kind: BackendKind,
    pub reference: String,
}

/// Canonical 4-way status every backend report is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    Starting,
    InProgress,
    Completed,
    Failed,
}
