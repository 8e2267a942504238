//! Error types for the registry search pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors from querying the registry or handling its results
#[derive(Debug, Error)]
pub enum DockstoreError {
    /// No condition survived validation
    #[error("no valid search conditions: expected [field, operator, term] triples")]
    EmptyQuery,

    /// Backend could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Backend answered with a non-success status
    #[error("Search backend error (HTTP {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Backend did not answer in time
    #[error("Search timed out after {0} seconds")]
    Timeout(u64),

    /// Backend response could not be decoded
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),

    /// Requested workflow is not among the saved results
    #[error("Workflow not found in saved results: {0}")]
    WorkflowNotFound(String),

    /// Workflow carries no WDL source with content
    #[error("No WDL files with content found for workflow: {0}")]
    NoWdlFiles(String),

    /// No saved results file under the searched directory
    #[error("No {file} found under {root}")]
    NoSavedResults {
        /// File name looked for
        file: &'static str,
        /// Directory searched
        root: PathBuf,
    },

    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DockstoreError {
    /// Whether the error came from the caller's input rather than a service
    pub fn is_validation(&self) -> bool {
        matches!(self, DockstoreError::EmptyQuery)
    }
}

impl From<reqwest::Error> for DockstoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DockstoreError::Connection(format!("request timed out: {}", e))
        } else if e.is_connect() {
            DockstoreError::Connection(e.to_string())
        } else if e.is_decode() {
            DockstoreError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            DockstoreError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            DockstoreError::Connection(e.to_string())
        }
    }
}

/// Errors from the rerank service
///
/// These never reach the end caller: the reranker turns every one of them
/// into a degraded ranking.
#[derive(Debug, Error)]
pub enum RerankError {
    /// Service could not be reached
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service answered with a non-success status
    #[error("Rerank service error (HTTP {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response was not a list of `{index, score}`
    #[error("Invalid rerank response: {0}")]
    InvalidResponse(String),

    /// Response referenced a hit that does not exist
    #[error("Rerank index {index} out of range for {len} hits")]
    IndexOutOfRange {
        /// Returned index
        index: usize,
        /// Number of hits sent
        len: usize,
    },

    /// Response scored the same hit more than once
    #[error("Rerank response repeats index {0}")]
    DuplicateIndex(usize),

    /// Service did not answer within the timeout
    #[error("Rerank timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// No rerank service configured
    #[error("Reranking disabled")]
    Disabled,
}

impl From<reqwest::Error> for RerankError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RerankError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            RerankError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            RerankError::Communication(e.to_string())
        }
    }
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, DockstoreError>;
