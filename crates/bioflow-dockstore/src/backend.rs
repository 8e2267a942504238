//! Search backend: the registry's Elasticsearch endpoint

use crate::error::{DockstoreError, Result};
use async_trait::async_trait;
use bioflow_domain::SearchResponse;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default registry search endpoint
pub const DEFAULT_SEARCH_URL: &str =
    "https://dockstore.org/api/api/ga4gh/v2/extended/tools/entry/_search";

/// Default upper bound for one search request
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Something that can execute a compiled search body
///
/// Implemented over HTTP for the live registry and by in-memory fakes in
/// tests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run the search and return the raw response
    ///
    /// The raw JSON is kept so callers can persist exactly what the backend
    /// sent; `parse_response` extracts the hits.
    async fn search(&self, body: &Value) -> Result<Value>;
}

/// Decode the hits of a raw backend response
pub fn parse_response(raw: &Value) -> Result<SearchResponse> {
    SearchResponse::deserialize(raw).map_err(|e| DockstoreError::InvalidResponse(e.to_string()))
}

/// HTTP search backend
pub struct HttpSearchBackend {
    url: String,
    client: reqwest::Client,
}

impl HttpSearchBackend {
    /// Create a backend for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bioflow-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Endpoint this backend posts to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, body: &Value) -> Result<Value> {
        // Fresh tracing IDs per request
        let request_id = Uuid::now_v7().to_string();
        let session_id = Uuid::now_v7().to_string();
        debug!(url = %self.url, %request_id, "Posting search request");

        let response = self
            .client
            .post(&self.url)
            .header("accept", "application/json")
            .header("origin", "https://dockstore.org")
            .header("x-request-id", &request_id)
            .header("x-session-id", &session_id)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| text.is_char_boundary(*i))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            return Err(DockstoreError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Received search response");
        serde_json::from_slice(&bytes).map_err(|e| DockstoreError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_hits() {
        let raw = json!({"hits": {"hits": [{"_source": {"name": "a"}, "_score": 1.0}]}});
        let response = parse_response(&raw).unwrap();
        assert_eq!(response.hits().len(), 1);
    }

    #[test]
    fn test_parse_response_rejects_bad_shape() {
        let raw = json!({"hits": {"hits": "nope"}});
        let err = parse_response(&raw).unwrap_err();
        assert!(matches!(err, DockstoreError::InvalidResponse(_)));
    }

    #[test]
    fn test_http_backend_builds() {
        let backend = HttpSearchBackend::new(DEFAULT_SEARCH_URL, Duration::from_secs(5)).unwrap();
        assert_eq!(backend.url(), DEFAULT_SEARCH_URL);
    }
}
