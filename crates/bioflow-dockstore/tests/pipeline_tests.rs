//! Integration tests for the registry search pipeline
//!
//! The backend and rerank service are in-memory fakes; everything between
//! them (query compilation, timeouts, fallback, selection, formatting,
//! persistence) is the real code.

use async_trait::async_trait;
use bioflow_dockstore::{
    download_workflow, fallback_ranking, Detail, DockstoreError, RerankError, RerankService,
    Reranker, ResultFormatter, SearchBackend, SearchRequest, WorkflowSearch,
};
use bioflow_domain::{BooleanOperator, RankedHit, SearchCondition, SearchHit, SearchResponse};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Backend returning a canned response and recording request bodies
struct FakeBackend {
    response: Value,
    delay: Duration,
    requests: Mutex<Vec<Value>>,
}

impl FakeBackend {
    fn new(response: Value) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn slow(response: Value, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(response)
        }
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(&self, body: &Value) -> bioflow_dockstore::Result<Value> {
        self.requests.lock().unwrap().push(body.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.response.clone())
    }
}

struct FailingBackend;

#[async_trait]
impl SearchBackend for FailingBackend {
    async fn search(&self, _body: &Value) -> bioflow_dockstore::Result<Value> {
        Err(DockstoreError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }
}

/// Rerank service that never answers in time
struct SlowReranker(Duration);

#[async_trait]
impl RerankService for SlowReranker {
    async fn rerank(
        &self,
        _query: &str,
        texts: &[String],
        _limit: Duration,
    ) -> Result<Vec<RankedHit>, RerankError> {
        tokio::time::sleep(self.0).await;
        Ok((0..texts.len()).map(|i| RankedHit::new(i, 100.0)).collect())
    }
}

/// Rerank service that reverses backend order and records its input
struct ReversingReranker {
    seen: Mutex<Option<(String, Vec<String>)>>,
}

#[async_trait]
impl RerankService for ReversingReranker {
    async fn rerank(
        &self,
        query: &str,
        texts: &[String],
        _limit: Duration,
    ) -> Result<Vec<RankedHit>, RerankError> {
        *self.seen.lock().unwrap() = Some((query.to_string(), texts.to_vec()));
        Ok((0..texts.len()).map(|i| RankedHit::new(i, i as f64)).collect())
    }
}

fn backend_response(scores: &[f64]) -> Value {
    let hits: Vec<Value> = scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            json!({
                "_id": format!("doc-{}", i),
                "_score": score,
                "_source": {
                    "name": format!("wf-{}", i),
                    "description": format!("workflow number {}", i),
                    "full_workflow_path": format!("github.com/org/wf-{}", i)
                }
            })
        })
        .collect();
    json!({"hits": {"total": {"value": hits.len()}, "hits": hits}})
}

fn conditions() -> Vec<SearchCondition> {
    vec![
        SearchCondition::new("organization", BooleanOperator::And, "broadinstitute"),
        SearchCondition::new("descriptorType", BooleanOperator::And, "WDL"),
    ]
}

fn pipeline(backend: Arc<dyn SearchBackend>, reranker: Reranker) -> WorkflowSearch {
    WorkflowSearch::new(backend, reranker, ResultFormatter::default())
}

const TEN_SCORES: [f64; 10] = [9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0];

#[tokio::test]
async fn test_forced_fallback_truncates_to_top_n() {
    let backend = Arc::new(FakeBackend::new(backend_response(&TEN_SCORES)));
    let reranker = Reranker::new(
        Arc::new(SlowReranker(Duration::from_millis(300))),
        Duration::from_millis(20),
    );
    let search = pipeline(backend, reranker);

    let outcome = search.search(&SearchRequest::new(conditions())).await.unwrap();

    assert_eq!(outcome.total_hits, 10);
    assert!(outcome.degraded.as_deref().unwrap_or_default().contains("timed out"));
    let names: Vec<&str> = outcome.selected.iter().map(|s| s.hit.display_name()).collect();
    let scores: Vec<f64> = outcome.selected.iter().map(|s| s.score).collect();
    assert_eq!(names, vec!["wf-0", "wf-1", "wf-2"]);
    assert_eq!(scores, vec![9.0, 8.0, 7.0]);
}

#[tokio::test]
async fn test_fallback_is_deterministic() {
    let hits = bioflow_dockstore::parse_response(&backend_response(&TEN_SCORES))
        .unwrap()
        .into_hits();
    let reranker = Reranker::new(
        Arc::new(SlowReranker(Duration::from_millis(200))),
        Duration::from_millis(10),
    );

    let first = reranker.rerank("cnv", &hits, 4).await;
    let second = reranker.rerank("cnv", &hits, 4).await;

    assert!(first.is_degraded());
    assert_eq!(first.ranked(), second.ranked());
    assert_eq!(first.ranked(), fallback_ranking(&hits, 4).as_slice());
}

#[tokio::test]
async fn test_reranker_order_and_inputs() {
    let backend = Arc::new(FakeBackend::new(backend_response(&[3.0, 2.0, 1.0])));
    let service = Arc::new(ReversingReranker {
        seen: Mutex::new(None),
    });
    let search = pipeline(
        backend.clone(),
        Reranker::new(service.clone(), Duration::from_secs(5)),
    );

    let mut request = SearchRequest::new(conditions());
    request.top_n = 2;
    let outcome = search.search(&request).await.unwrap();

    assert!(outcome.degraded.is_none());
    let names: Vec<&str> = outcome.rendered.links().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["wf-2", "wf-1"]);

    let (query, texts) = service.seen.lock().unwrap().clone().unwrap();
    assert_eq!(query, "broadinstitute WDL");
    assert_eq!(texts[0], "wf-0 - workflow number 0");

    let sent = backend.requests.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["query"]["bool"]["should"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_backend_failure_is_fatal() {
    let search = pipeline(Arc::new(FailingBackend), Reranker::disabled());
    let err = search.search(&SearchRequest::new(conditions())).await.unwrap_err();
    assert!(matches!(err, DockstoreError::Status { status: 502, .. }));
}

#[tokio::test]
async fn test_backend_timeout_is_fatal() {
    let backend = Arc::new(FakeBackend::slow(backend_response(&[1.0]), Duration::from_secs(5)));
    let search = pipeline(backend, Reranker::disabled())
        .with_search_timeout(Duration::from_millis(20));

    let err = search.search(&SearchRequest::new(conditions())).await.unwrap_err();
    assert!(matches!(err, DockstoreError::Timeout(_)));
}

#[tokio::test]
async fn test_empty_query_never_reaches_backend() {
    let backend = Arc::new(FakeBackend::new(backend_response(&[1.0])));
    let search = pipeline(backend.clone(), Reranker::disabled());

    let err = search.search(&SearchRequest::new(Vec::new())).await.unwrap_err();
    assert!(matches!(err, DockstoreError::EmptyQuery));
    assert!(backend.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_hits_is_empty_outcome() {
    let backend = Arc::new(FakeBackend::new(json!({"hits": {"hits": []}})));
    let search = pipeline(backend, Reranker::disabled());

    let outcome = search.search(&SearchRequest::new(conditions())).await.unwrap();
    assert!(outcome.is_empty());
    assert!(outcome.rendered.links().is_empty());
}

#[tokio::test]
async fn test_full_detail_rendering() {
    let backend = Arc::new(FakeBackend::new(backend_response(&[2.0, 1.0])));
    let search = pipeline(backend, Reranker::disabled());

    let mut request = SearchRequest::new(conditions());
    request.detail = Detail::Full;
    let outcome = search.search(&request).await.unwrap();

    let text = outcome.rendered.to_text();
    assert!(text.contains("### 1. wf-0"));
    assert!(text.contains("### 2. wf-1"));
    assert!(text.contains("Description: workflow number 0"));
}

#[tokio::test]
async fn test_saved_results_then_download() {
    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("results").join("dockstore_results.json");

    let mut response = backend_response(&[1.0]);
    response["hits"]["hits"][0]["_source"]["workflowVersions"] = json!([
        {"name": "v1", "sourceFiles": [
            {"path": "/pipeline/main.wdl", "content": "version 1.0\nworkflow main {}"},
            {"path": "/pipeline/inputs.json", "content": "{}"}
        ]},
        {"name": "v2", "sourceFiles": [
            {"path": "/pipeline/tasks.wdl", "content": "version 1.0\ntask t {}"}
        ]}
    ]);
    let search = pipeline(Arc::new(FakeBackend::new(response)), Reranker::disabled());

    let mut request = SearchRequest::new(conditions());
    request.save_results = Some(results_path.clone());
    let outcome = search.search(&request).await.unwrap();
    assert_eq!(outcome.saved_to.as_deref(), Some(results_path.as_path()));

    let output_dir = dir.path().join("wdl");
    let downloaded = download_workflow(&results_path, "github.com/org/wf-0", &output_dir).unwrap();
    assert_eq!(downloaded.directory, output_dir.join("wf-0"));
    assert_eq!(downloaded.files.len(), 2);
    let main = std::fs::read_to_string(output_dir.join("wf-0").join("main.wdl")).unwrap();
    assert!(main.contains("workflow main"));
    assert!(!output_dir.join("wf-0").join("inputs.json").exists());

    let err = download_workflow(&results_path, "github.com/org/absent", &output_dir).unwrap_err();
    assert!(matches!(err, DockstoreError::WorkflowNotFound(_)));
}

#[test]
fn test_unscored_hits_fall_back_to_zero() {
    let response: SearchResponse = serde_json::from_value(json!({
        "hits": {"hits": [{"_source": {"name": "x"}}]}
    }))
    .unwrap();
    let hits: Vec<SearchHit> = response.into_hits();
    assert_eq!(fallback_ranking(&hits, 3), vec![RankedHit::new(0, 0.0)]);
}
