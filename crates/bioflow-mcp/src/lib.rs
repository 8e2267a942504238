//! Bioflow MCP Server
//!
//! Model Context Protocol server exposing workflow authoring tools to AI
//! clients over stdio.
//!
//! Provides 12 MCP tools:
//! - `compose_input_json` - Fill an input template for a batch of samples
//! - `search_dockstore` - Search the workflow registry, reranked for relevance
//! - `dockstore_workflow_download` - Write a workflow's WDL files from saved results
//! - `result_summary` - Summarize every workflow in saved results
//! - `validate_wdl` / `validate_workflow_input_json` - womtool validation
//! - `import_workflow` / `submit_workflow` - platform import and submission
//! - `check_workflow_run_status` / `check_workflow_import_status` - status checks
//! - `get_workflow_logs` - submission log retrieval
//! - `get_docker_image_url` - container image address
//!
//! # Example
//!
//! ```no_run
//! use bioflow_mcp::{Config, McpServer, Services};
//! use std::sync::Arc;
//!
//! let services = Services::from_config(&Config::default()).unwrap();
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(Arc::new(McpServer::new(services)).run()).unwrap();
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod protocol;
mod server;
mod services;
pub mod tools;

pub use config::{Config, ConfigError};
pub use error::McpError;
pub use server::McpServer;
pub use services::Services;
