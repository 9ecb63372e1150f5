//! Complaint API client.
//!
//! `GET {base}/api/complaints` with a bearer token returns every complaint
//! as a JSON array, each carrying its identifier under `id`.

use super::parse_backlog;
use crate::domain::SourceError;
use crate::ports::ComplaintSource;
use async_trait::async_trait;
use reqwest::Client;
use shared_types::ComplaintRecord;
use std::time::Duration;
use tracing::debug;

const MAX_ERROR_BODY: usize = 200;

/// HTTP settings for [`HttpComplaintSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// API base, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Bearer token for the complaint API.
    pub token: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Reads the backlog from the complaint API.
pub struct HttpComplaintSource {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpComplaintSource {
    /// Builds the client.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/complaints", config.base_url.trim_end_matches('/')),
            token: config.token,
        })
    }

    /// Full listing URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ComplaintSource for HttpComplaintSource {
    async fn list_complaints(&self) -> Result<Vec<ComplaintRecord>, SourceError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "complaint API response");

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        parse_backlog(&body)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
