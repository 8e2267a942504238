//! Error types for input composition

use bioflow_domain::ParamsShapeError;
use std::path::PathBuf;
use thiserror::Error;

/// Hard errors that stop a composition request
///
/// Per-sample problems (missing or undeclared fields) are not errors at this
/// level; they travel as `FieldError` values inside a `Composition`.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Claimed sample count is not positive
    #[error("sample_count must be a positive integer, got {0}")]
    InvalidSampleCount(usize),

    /// Supplied list length neither matches the claim nor is one
    #[error("sample count mismatch: sample_count={expected}, but params has {found} entries")]
    CountMismatch {
        /// Claimed sample count
        expected: usize,
        /// Length of the supplied list
        found: usize,
    },

    /// Params were neither an object nor a list of objects
    #[error("invalid params: {0}")]
    InvalidParamsType(#[from] ParamsShapeError),

    /// Template file could not be read
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        /// Template path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Template file is not a JSON object
    #[error("template {path} is not a valid template: {reason}")]
    InvalidTemplate {
        /// Template path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Filled samples could not be written
    #[error("failed to write {path}: {source}")]
    OutputWrite {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for composition operations
pub type Result<T> = std::result::Result<T, ComposeError>;
