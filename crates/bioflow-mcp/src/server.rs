//! MCP server implementation

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::McpError;
use crate::protocol::*;
use crate::services::Services;
use crate::tools;

/// MCP Server
///
/// Handles Model Context Protocol requests via stdio transport. Every
/// request runs as its own task; responses go through a single writer so
/// output lines never interleave.
pub struct McpServer {
    services: Services,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Run the MCP server (stdio transport)
    ///
    /// Reads JSON-RPC requests from stdin until it closes, then waits for
    /// in-flight requests to finish writing their responses.
    pub async fn run(self: Arc<Self>) -> Result<(), McpError> {
        info!("MCP server started");

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = rx.recv().await {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
                debug!("Sent response: {}", line);
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received request: {}", line);

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    match serde_json::to_string(&response) {
                        Ok(encoded) => {
                            if tx.send(encoded).is_err() {
                                warn!("Response writer closed, dropping response");
                            }
                        }
                        Err(e) => error!(error = %e, "Failed to encode response"),
                    }
                }
            });
        }

        drop(tx);
        writer
            .await
            .map_err(|e| McpError::Io(std::io::Error::other(e)))??;

        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one input line
    ///
    /// Returns the response to write, or `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Some(error_response(None, &McpError::Parse(e.to_string())));
            }
        };

        let id = raw.get("id").filter(|id| !id.is_null()).cloned();
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(id, &McpError::InvalidRequest(e.to_string())));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<Value> {
        let id = request.id.clone();

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let result = if request.jsonrpc != "2.0" {
            Err(McpError::InvalidRequest(format!(
                "unsupported jsonrpc version: {}",
                request.jsonrpc
            )))
        } else {
            match request.method.as_str() {
                "initialize" => self.handle_initialize(),
                "tools/list" => self.handle_tools_list(),
                "tools/call" => self.handle_tool_call(request.params).await,
                "ping" => Ok(json!({})),
                other => Err(McpError::MethodNotFound(other.to_string())),
            }
        };

        Some(match result {
            Ok(value) => encode(&JsonRpcResponse::new(id, value)),
            Err(e) => error_response(id, &e),
        })
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Result<Value, McpError> {
        let response = InitializeResponse {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "bioflow-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: Capabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
        };
        Ok(serde_json::to_value(response)?)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let response = ToolListResponse {
            tools: tools::definitions(),
        };
        Ok(serde_json::to_value(response)?)
    }

    /// Handle tools/call request
    async fn handle_tool_call(&self, params: Value) -> Result<Value, McpError> {
        let call: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidParams(format!("tools/call: {}", e)))?;

        info!(tool = %call.name, "Tool call");
        match tools::call(&self.services, &call.name, call.arguments).await {
            Ok(result) => {
                if result.is_error {
                    info!(tool = %call.name, "Tool reported an error result");
                }
                Ok(serde_json::to_value(result)?)
            }
            Err(e) => {
                warn!(tool = %call.name, code = e.error_code(), error = %e, "Tool call failed");
                Err(e)
            }
        }
    }
}

fn error_response(id: Option<Value>, err: &McpError) -> Value {
    encode(&JsonRpcError::new(id, err.error_code(), err.to_string()))
}

fn encode<T: Serialize>(message: &T) -> Value {
    serde_json::to_value(message).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode response");
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32603, "message": "Internal error"}
        })
    })
}
