//! HTTP compute backend adapter
//!
//! Production adapter used for all three backend styles. Each instance
//! points at one backend service exposing the execution API:
//!
//! - `POST {base}/executions` -> `{ "reference": ... }`
//! - `GET  {base}/executions/{ref}/status` -> `{ "status", "progress", "error" }`
//! - `GET  {base}/executions/{ref}/results` -> `{ "uris": [...] }`

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use strata_core::domain::backend::{BackendKind, BackendStatus};
use strata_core::domain::tier::ResourceProfile;

use super::{BackendError, BackendPoll, ComputeBackend};

pub struct HttpBackend {
    kind: BackendKind,
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(kind: BackendKind, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(format!("invalid JSON response: {}", e)))
    }
}

#[async_trait]
impl ComputeBackend for HttpBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn submit(
        &self,
        job_id: Uuid,
        params: &HashMap<String, serde_json::Value>,
        profile: &ResourceProfile,
    ) -> Result<String, BackendError> {
        let request = SubmitRequest {
            job_id,
            params: params.clone(),
            profile: profile.clone(),
        };

        let response = self
            .client
            .post(format!("{}/executions", self.base_url))
            .json(&request)
            .send()
            .await?;

        let created: SubmitResponse = self.handle_response(response).await?;
        Ok(created.reference)
    }

    async fn poll_status(&self, reference: &str) -> Result<BackendPoll, BackendError> {
        let response = self
            .client
            .get(format!("{}/executions/{}/status", self.base_url, reference))
            .send()
            .await?;

        let status: StatusResponse = self.handle_response(response).await?;
        Ok(BackendPoll {
            status: status.status,
            progress: status.progress,
            error: status.error,
        })
    }

    async fn fetch_results(&self, reference: &str) -> Result<Vec<String>, BackendError> {
        let response = self
            .client
            .get(format!("{}/executions/{}/results", self.base_url, reference))
            .send()
            .await?;

        let results: ResultsResponse = self.handle_response(response).await?;
        Ok(results.uris)
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct SubmitRequest {
    job_id: Uuid,
    params: HashMap<String, serde_json::Value>,
    profile: ResourceProfile,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    reference: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: BackendStatus,
    progress: Option<u8>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    uris: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_trims_trailing_slash() {
        let backend = HttpBackend::new(BackendKind::Training, "http://localhost:9101/");
        assert_eq!(backend.base_url(), "http://localhost:9101");
        assert_eq!(backend.kind(), BackendKind::Training);
    }

    #[test]
    fn test_status_response_parsing() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"status":"in_progress","progress":40,"error":null}"#).unwrap();
        assert_eq!(parsed.status, BackendStatus::InProgress);
        assert_eq!(parsed.progress, Some(40));
    }
}
