//! Result reranker
//!
//! Sends the hits' display texts to an external rerank service and keeps the
//! best `top_n`. Every call carries its own timeout; any failure degrades to
//! the backend's own order instead of failing the search.

use crate::error::RerankError;
use async_trait::async_trait;
use bioflow_domain::{RankedHit, SearchHit};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default upper bound for one rerank call
pub const DEFAULT_RERANK_TIMEOUT_SECS: u64 = 60;

/// A service that scores texts against a query
#[async_trait]
pub trait RerankService: Send + Sync {
    /// Score `texts` against `query`, giving up after `limit`
    ///
    /// Returns `(index, score)` pairs, where `index` points into `texts`.
    /// Order and length are not significant.
    async fn rerank(
        &self,
        query: &str,
        texts: &[String],
        limit: Duration,
    ) -> Result<Vec<RankedHit>, RerankError>;
}

/// Request body understood by the rerank service
#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [String],
}

/// Rerank service reached over HTTP
///
/// Posts `{query, texts}` and expects a JSON array of `{index, score}`.
/// The timeout is set per request, so one client serves every call
/// whatever limit the caller picks.
pub struct HttpRerankClient {
    client: reqwest::Client,
    url: String,
}

impl HttpRerankClient {
    /// Create a client for `url`
    pub fn new(url: impl Into<String>) -> Result<Self, RerankError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RerankError::Communication(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RerankService for HttpRerankClient {
    async fn rerank(
        &self,
        query: &str,
        texts: &[String],
        limit: Duration,
    ) -> Result<Vec<RankedHit>, RerankError> {
        let timed_out = |e: reqwest::Error| {
            if e.is_timeout() {
                RerankError::Timeout(limit)
            } else {
                RerankError::from(e)
            }
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(limit)
            .json(&RerankRequest { query, texts })
            .send()
            .await
            .map_err(timed_out)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RerankError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(timed_out)?;
        serde_json::from_slice::<Vec<RankedHit>>(&body)
            .map_err(|e| RerankError::InvalidResponse(e.to_string()))
    }
}

/// Outcome of ranking a hit list
///
/// Degradation is a visible branch, not an error: the ranking is always
/// usable, but a degraded one is the backend's order rather than the
/// reranker's.
#[derive(Debug, Clone, PartialEq)]
pub enum RerankOutcome {
    /// The service ranked the hits
    Reranked(Vec<RankedHit>),

    /// The service was unavailable; backend order was used
    Degraded {
        /// First `top_n` hits with their backend scores
        ranked: Vec<RankedHit>,
        /// Why the service result was not used
        reason: String,
    },
}

impl RerankOutcome {
    /// Selected hits, best first
    pub fn ranked(&self) -> &[RankedHit] {
        match self {
            RerankOutcome::Reranked(ranked) => ranked,
            RerankOutcome::Degraded { ranked, .. } => ranked,
        }
    }

    /// Take ownership of the selected hits
    pub fn into_ranked(self) -> Vec<RankedHit> {
        match self {
            RerankOutcome::Reranked(ranked) => ranked,
            RerankOutcome::Degraded { ranked, .. } => ranked,
        }
    }

    /// Whether the fallback ranking was used
    pub fn is_degraded(&self) -> bool {
        matches!(self, RerankOutcome::Degraded { .. })
    }

    /// Reason for degradation, if any
    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            RerankOutcome::Reranked(_) => None,
            RerankOutcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Backend order, truncated to `top_n`, with backend scores copied through
pub fn fallback_ranking(hits: &[SearchHit], top_n: usize) -> Vec<RankedHit> {
    hits.iter()
        .take(top_n)
        .enumerate()
        .map(|(index, hit)| RankedHit::new(index, hit.backend_score()))
        .collect()
}

/// Validate service scores, sort them best first and keep `top_n`
///
/// An index outside the hit list, or one scored twice, invalidates the
/// whole response.
pub fn select_top(
    mut scores: Vec<RankedHit>,
    hit_count: usize,
    top_n: usize,
) -> Result<Vec<RankedHit>, RerankError> {
    if let Some(bad) = scores.iter().find(|s| s.index >= hit_count) {
        return Err(RerankError::IndexOutOfRange {
            index: bad.index,
            len: hit_count,
        });
    }
    let mut seen = HashSet::with_capacity(scores.len());
    if let Some(repeat) = scores.iter().find(|s| !seen.insert(s.index)) {
        return Err(RerankError::DuplicateIndex(repeat.index));
    }
    scores.sort_by(RankedHit::by_score_desc);
    scores.truncate(top_n);
    Ok(scores)
}

/// Reranks hits through an optional service with a bounded wait
#[derive(Clone)]
pub struct Reranker {
    service: Option<Arc<dyn RerankService>>,
    timeout: Duration,
}

impl Reranker {
    /// Create a reranker around a service
    pub fn new(service: Arc<dyn RerankService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    /// A reranker that always uses the fallback ranking
    pub fn disabled() -> Self {
        Self {
            service: None,
            timeout: Duration::from_secs(DEFAULT_RERANK_TIMEOUT_SECS),
        }
    }

    /// Same service, different timeout
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            service: self.service.clone(),
            timeout,
        }
    }

    /// Whether a service is configured
    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Rank `hits` for `query`, keeping at most `top_n`
    ///
    /// Never fails: timeouts and service errors yield `Degraded`.
    pub async fn rerank(&self, query: &str, hits: &[SearchHit], top_n: usize) -> RerankOutcome {
        if hits.is_empty() {
            return RerankOutcome::Reranked(Vec::new());
        }

        match self.call_service(query, hits, top_n).await {
            Ok(ranked) => {
                debug!(selected = ranked.len(), "Reranked hits");
                RerankOutcome::Reranked(ranked)
            }
            Err(RerankError::Disabled) => RerankOutcome::Degraded {
                ranked: fallback_ranking(hits, top_n),
                reason: RerankError::Disabled.to_string(),
            },
            Err(e) => {
                warn!(error = %e, "Rerank failed, falling back to backend order");
                RerankOutcome::Degraded {
                    ranked: fallback_ranking(hits, top_n),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn call_service(
        &self,
        query: &str,
        hits: &[SearchHit],
        top_n: usize,
    ) -> Result<Vec<RankedHit>, RerankError> {
        let service = self.service.as_ref().ok_or(RerankError::Disabled)?;
        let texts: Vec<String> = hits.iter().map(SearchHit::rerank_text).collect();

        // The outer bound also covers services that ignore `limit`
        let scores = timeout(self.timeout, service.rerank(query, &texts, self.timeout))
            .await
            .map_err(|_| RerankError::Timeout(self.timeout))??;

        select_top(scores, hits.len(), top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn hits(scores: &[f64]) -> Vec<SearchHit> {
        scores
            .iter()
            .map(|s| SearchHit::new(Map::new(), Some(*s)))
            .collect()
    }

    struct FixedService(Vec<RankedHit>);

    #[async_trait]
    impl RerankService for FixedService {
        async fn rerank(
            &self,
            _query: &str,
            _texts: &[String],
            _limit: Duration,
        ) -> Result<Vec<RankedHit>, RerankError> {
            Ok(self.0.clone())
        }
    }

    struct FailingService;

    #[async_trait]
    impl RerankService for FailingService {
        async fn rerank(
            &self,
            _query: &str,
            _texts: &[String],
            _limit: Duration,
        ) -> Result<Vec<RankedHit>, RerankError> {
            Err(RerankError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    /// Serve one HTTP request per connection, answering `body` after `delay`
    async fn slow_rerank_server(delay: Duration, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 4096];
                    loop {
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        if n == 0 {
                            return;
                        }
                        request.extend_from_slice(&buf[..n]);
                        if request_complete(&request) {
                            break;
                        }
                    }
                    tokio::time::sleep(delay).await;
                    let reply = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}/rerank", addr)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + length
    }

    #[test]
    fn test_reranker_trait_is_object_safe() {
        fn _accepts_dyn(_r: &dyn RerankService) {}
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpRerankClient::new("http://localhost:8421/rerank").unwrap();
        assert_eq!(client.url(), "http://localhost:8421/rerank");
    }

    #[tokio::test]
    async fn test_longer_call_timeout_lets_slow_service_answer() {
        let url = slow_rerank_server(
            Duration::from_millis(400),
            r#"[{"index":0,"score":0.2},{"index":1,"score":0.8}]"#,
        )
        .await;
        let client = HttpRerankClient::new(url).unwrap();
        let configured = Reranker::new(Arc::new(client), Duration::from_millis(100));

        let outcome = configured
            .with_timeout(Duration::from_secs(5))
            .rerank("q", &hits(&[2.0, 1.0]), 2)
            .await;

        assert!(!outcome.is_degraded(), "{:?}", outcome.degradation_reason());
        assert_eq!(outcome.ranked(), &[RankedHit::new(1, 0.8), RankedHit::new(0, 0.2)]);
    }

    #[tokio::test]
    async fn test_http_timeout_reported_as_timeout() {
        let url = slow_rerank_server(Duration::from_millis(500), "[]").await;
        let client = HttpRerankClient::new(url).unwrap();

        let err = client
            .rerank("q", &["a".to_string()], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, RerankError::Timeout(limit) if limit == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_configured_timeout_degrades_slow_service() {
        let url = slow_rerank_server(Duration::from_millis(500), "[]").await;
        let client = HttpRerankClient::new(url).unwrap();
        let reranker = Reranker::new(Arc::new(client), Duration::from_millis(50));

        let outcome = reranker.rerank("q", &hits(&[2.0, 1.0]), 2).await;
        assert!(outcome.degradation_reason().unwrap_or_default().contains("timed out"));
        assert_eq!(outcome.ranked(), &[RankedHit::new(0, 2.0), RankedHit::new(1, 1.0)]);
    }

    #[test]
    fn test_fallback_takes_backend_order() {
        let ranked = fallback_ranking(&hits(&[9.0, 8.0, 7.0, 6.0]), 3);
        assert_eq!(
            ranked,
            vec![RankedHit::new(0, 9.0), RankedHit::new(1, 8.0), RankedHit::new(2, 7.0)]
        );
    }

    #[test]
    fn test_fallback_unscored_hit_is_zero() {
        let hit = SearchHit::new(Map::new(), None);
        assert_eq!(fallback_ranking(&[hit], 3), vec![RankedHit::new(0, 0.0)]);
    }

    #[test]
    fn test_select_top_rejects_bad_index() {
        let err = select_top(vec![RankedHit::new(5, 1.0)], 3, 3).unwrap_err();
        assert!(matches!(err, RerankError::IndexOutOfRange { index: 5, len: 3 }));
    }

    #[test]
    fn test_select_top_rejects_repeated_index() {
        let scores = vec![RankedHit::new(1, 0.9), RankedHit::new(0, 0.5), RankedHit::new(1, 0.4)];
        let err = select_top(scores, 3, 3).unwrap_err();
        assert!(matches!(err, RerankError::DuplicateIndex(1)));
    }

    #[tokio::test]
    async fn test_repeated_index_degrades() {
        let service = FixedService(vec![RankedHit::new(1, 0.9), RankedHit::new(1, 0.8)]);
        let reranker = Reranker::new(Arc::new(service), Duration::from_secs(5));
        let outcome = reranker.rerank("q", &hits(&[3.0, 2.0]), 2).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.ranked(), &[RankedHit::new(0, 3.0), RankedHit::new(1, 2.0)]);
    }

    #[tokio::test]
    async fn test_service_order_wins() {
        let service = FixedService(vec![
            RankedHit::new(0, 0.1),
            RankedHit::new(2, 0.9),
            RankedHit::new(1, 0.5),
        ]);
        let reranker = Reranker::new(Arc::new(service), Duration::from_secs(5));
        let outcome = reranker.rerank("cnv", &hits(&[1.0, 1.0, 1.0]), 2).await;

        assert!(!outcome.is_degraded());
        assert_eq!(
            outcome.ranked(),
            &[RankedHit::new(2, 0.9), RankedHit::new(1, 0.5)]
        );
    }

    #[tokio::test]
    async fn test_service_error_degrades() {
        let reranker = Reranker::new(Arc::new(FailingService), Duration::from_secs(5));
        let outcome = reranker.rerank("cnv", &hits(&[3.0, 2.0]), 5).await;

        assert!(outcome.is_degraded());
        assert!(outcome.degradation_reason().unwrap_or_default().contains("503"));
        assert_eq!(outcome.ranked(), &[RankedHit::new(0, 3.0), RankedHit::new(1, 2.0)]);
    }

    #[tokio::test]
    async fn test_disabled_degrades() {
        let outcome = Reranker::disabled().rerank("q", &hits(&[1.0]), 3).await;
        assert_eq!(outcome.degradation_reason(), Some("Reranking disabled"));
    }

    #[tokio::test]
    async fn test_empty_hits() {
        let outcome = Reranker::disabled().rerank("q", &[], 3).await;
        assert!(outcome.ranked().is_empty());
    }
}
