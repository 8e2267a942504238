//! Search pipeline: build query → backend search → rerank → format

use crate::backend::{parse_response, SearchBackend, DEFAULT_SEARCH_TIMEOUT_SECS};
use crate::error::{DockstoreError, Result};
use crate::formatter::{Detail, Rendered, ResultFormatter, ScoredHit};
use crate::query::{build, QueryOptions};
use crate::rerank::Reranker;
use crate::selector::save_results;
use bioflow_domain::SearchCondition;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Default number of results kept after ranking
pub const DEFAULT_TOP_N: usize = 3;

/// One search invocation
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Conditions to compile
    pub conditions: Vec<SearchCondition>,
    /// Query compilation options
    pub options: QueryOptions,
    /// Results to keep
    pub top_n: usize,
    /// Rendering detail
    pub detail: Detail,
    /// Rerank timeout override for this call
    pub rerank_timeout: Option<Duration>,
    /// Where to store the raw backend response
    pub save_results: Option<PathBuf>,
}

impl SearchRequest {
    /// Request with default options for `conditions`
    pub fn new(conditions: Vec<SearchCondition>) -> Self {
        Self {
            conditions,
            options: QueryOptions::default(),
            top_n: DEFAULT_TOP_N,
            detail: Detail::default(),
            rerank_timeout: None,
            save_results: None,
        }
    }
}

/// Result of a search invocation
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Free-text query the reranker scored against
    pub query: String,
    /// Hits returned by the backend
    pub total_hits: usize,
    /// Selected hits, best first
    pub selected: Vec<ScoredHit>,
    /// Rendered selection
    pub rendered: Rendered,
    /// Set when the backend order was used instead of the reranker's
    pub degraded: Option<String>,
    /// Where the raw response was stored
    pub saved_to: Option<PathBuf>,
}

impl SearchOutcome {
    /// Whether the backend returned nothing
    pub fn is_empty(&self) -> bool {
        self.total_hits == 0
    }
}

/// Wires the backend, reranker and formatter together
pub struct WorkflowSearch {
    backend: Arc<dyn SearchBackend>,
    reranker: Reranker,
    formatter: ResultFormatter,
    search_timeout: Duration,
}

impl WorkflowSearch {
    /// Create a pipeline
    pub fn new(backend: Arc<dyn SearchBackend>, reranker: Reranker, formatter: ResultFormatter) -> Self {
        Self {
            backend,
            reranker,
            formatter,
            search_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
        }
    }

    /// Set the upper bound for the backend call
    pub fn with_search_timeout(mut self, search_timeout: Duration) -> Self {
        self.search_timeout = search_timeout;
        self
    }

    /// Formatter used for rendering
    pub fn formatter(&self) -> &ResultFormatter {
        &self.formatter
    }

    /// Run one search
    ///
    /// Validation errors and backend failures (including timeouts) are
    /// returned as errors. Reranker failures are not: they show up as
    /// `degraded` on the outcome.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let query = build(&request.conditions, &request.options)?;
        info!(
            conditions = query.conditions.len(),
            query_type = request.options.query_type.as_str(),
            top_n = request.top_n,
            "Searching workflow registry"
        );

        let raw = timeout(self.search_timeout, self.backend.search(&query.body))
            .await
            .map_err(|_| DockstoreError::Timeout(self.search_timeout.as_secs()))??;

        let saved_to = match &request.save_results {
            Some(path) => {
                save_results(path, &raw)?;
                Some(path.clone())
            }
            None => None,
        };

        let hits = parse_response(&raw)?.into_hits();
        if hits.is_empty() {
            info!("Search returned no hits");
            return Ok(SearchOutcome {
                query: query.free_text,
                total_hits: 0,
                selected: Vec::new(),
                rendered: self.formatter.format(&[], request.detail),
                degraded: None,
                saved_to,
            });
        }

        let reranker = match request.rerank_timeout {
            Some(t) => self.reranker.with_timeout(t),
            None => self.reranker.clone(),
        };
        let outcome = reranker.rerank(&query.free_text, &hits, request.top_n).await;
        let degraded = outcome.degradation_reason().map(str::to_string);

        let selected: Vec<ScoredHit> = outcome
            .ranked()
            .iter()
            .filter_map(|ranked| {
                hits.get(ranked.index).map(|hit| ScoredHit {
                    hit: hit.clone(),
                    score: ranked.score,
                })
            })
            .collect();

        if let Some(reason) = &degraded {
            warn!(reason = %reason, "Returning backend-ranked results");
        }
        info!(total = hits.len(), selected = selected.len(), "Search complete");

        Ok(SearchOutcome {
            query: query.free_text,
            total_hits: hits.len(),
            rendered: self.formatter.format(&selected, request.detail),
            selected,
            degraded,
            saved_to,
        })
    }
}
