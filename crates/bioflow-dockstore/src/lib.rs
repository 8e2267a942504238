//! Bioflow Registry Search
//!
//! Searches the public workflow registry and narrows the results.
//!
//! ## Pipeline
//!
//! 1. **Query builder**: `(field, operator, term)` conditions → Elasticsearch body
//! 2. **Backend**: the registry search endpoint (bounded by a timeout; failure is fatal)
//! 3. **Reranker**: an external scoring service (bounded by a timeout; failure
//!    degrades to backend order)
//! 4. **Formatter**: concise links or detailed per-hit blocks
//!
//! The selector works on responses saved by earlier searches: it writes a
//! chosen workflow's WDL sources to disk or summarizes every saved hit.
//!
//! Backends and rerank services are injected as trait objects so tests can
//! substitute in-memory fakes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod formatter;
pub mod pipeline;
pub mod query;
pub mod rerank;
pub mod selector;

pub use backend::{parse_response, HttpSearchBackend, SearchBackend, DEFAULT_SEARCH_URL};
pub use error::{DockstoreError, RerankError, Result};
pub use formatter::{Detail, Rendered, ResultFormatter, ScoredHit, WorkflowLink};
pub use pipeline::{SearchOutcome, SearchRequest, WorkflowSearch, DEFAULT_TOP_N};
pub use query::{build, conditions_from_json, BackendQuery, QueryOptions};
pub use rerank::{
    fallback_ranking, HttpRerankClient, RerankOutcome, RerankService, Reranker,
    DEFAULT_RERANK_TIMEOUT_SECS,
};
pub use selector::{
    download_workflow, find_latest_results, summarize_results, DownloadedWorkflow, ResultSummary,
    RESULTS_FILE_NAME, SUMMARY_FILE_NAME,
};
