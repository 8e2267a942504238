//! Error types for MCP server operations.

use bioflow_compose::ComposeError;
use bioflow_dockstore::{DockstoreError, RerankError};
use bioflow_platform::PlatformError;
use thiserror::Error;

/// MCP server error types
#[derive(Error, Debug)]
pub enum McpError {
    /// Line is not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Message is not a valid JSON-RPC request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Tool arguments are missing or malformed
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Unknown JSON-RPC method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Input composition failed
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Registry search or download failed
    #[error(transparent)]
    Dockstore(#[from] DockstoreError),

    /// Rerank client could not be set up
    #[error("Rerank client error: {0}")]
    Rerank(#[from] RerankError),

    /// Platform CLI call failed
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::Parse(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::InvalidParams(_) => -32602,
            McpError::MethodNotFound(_) | McpError::ToolNotFound(_) => -32601,
            McpError::Compose(e) => match e {
                ComposeError::InvalidSampleCount(_)
                | ComposeError::CountMismatch { .. }
                | ComposeError::InvalidParamsType(_)
                | ComposeError::TemplateRead { .. }
                | ComposeError::InvalidTemplate { .. } => -32602,
                _ => -32000,
            },
            McpError::Dockstore(e) => match e {
                DockstoreError::Timeout(_) => -32001,
                DockstoreError::EmptyQuery
                | DockstoreError::WorkflowNotFound(_)
                | DockstoreError::NoWdlFiles(_)
                | DockstoreError::NoSavedResults { .. } => -32602,
                _ => -32000,
            },
            McpError::Platform(e) => match e {
                PlatformError::Timeout { .. } => -32001,
                e if e.is_validation() => -32602,
                _ => -32000,
            },
            McpError::Rerank(_) => -32000,
            McpError::Json(_) => -32603,
            McpError::Io(_) => -32000,
        }
    }

    /// Tool arguments failed to deserialize
    pub fn invalid_params(tool: &str, err: serde_json::Error) -> Self {
        McpError::InvalidParams(format!("{}: {}", tool, err))
    }
}
