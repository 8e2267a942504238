//! Collaborators shared by every tool call

use crate::config::Config;
use crate::error::McpError;
use bioflow_dockstore::{
    HttpRerankClient, HttpSearchBackend, Reranker, ResultFormatter, WorkflowSearch,
};
use bioflow_platform::{CommandRunner, ImageRegistry, ProgramNames, TokioCommandRunner};
use std::sync::Arc;
use tracing::info;

/// Everything a tool handler needs, built once at start-up
pub struct Services {
    /// Registry search pipeline
    pub search: WorkflowSearch,
    /// Results kept when a call does not say
    pub default_top_n: usize,
    /// Hits requested from the backend
    pub result_size: usize,
    /// Runs the platform CLIs
    pub runner: Arc<dyn CommandRunner>,
    /// Program names or paths
    pub programs: ProgramNames,
    /// Platform endpoint used when a call does not name one
    pub endpoint: String,
    /// Image registry for image URLs
    pub registry: ImageRegistry,
}

impl Services {
    /// Build HTTP clients and the subprocess runner from configuration
    pub fn from_config(config: &Config) -> Result<Self, McpError> {
        let backend = HttpSearchBackend::new(&config.dockstore.search_url, config.search_timeout())?;

        let reranker = match &config.rerank.url {
            Some(url) => {
                info!(url = %url, timeout_secs = config.rerank.timeout_secs, "Reranking enabled");
                let client = HttpRerankClient::new(url)?;
                Reranker::new(Arc::new(client), config.rerank_timeout())
            }
            None => {
                info!("No rerank service configured, using backend order");
                Reranker::disabled()
            }
        };

        let runner = match config.command_timeout() {
            Some(limit) => TokioCommandRunner::with_timeout(limit),
            None => TokioCommandRunner::new(),
        };

        let search = WorkflowSearch::new(
            Arc::new(backend),
            reranker,
            ResultFormatter::new(&config.dockstore.workflow_base_url),
        )
        .with_search_timeout(config.search_timeout());

        Ok(Self {
            search,
            default_top_n: config.dockstore.default_top_n,
            result_size: config.dockstore.result_size,
            runner: Arc::new(runner),
            programs: config.platform.programs.clone(),
            endpoint: config.platform.endpoint.clone(),
            registry: config.docker.clone(),
        })
    }
}
