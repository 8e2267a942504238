//! Search tool - Find workflows in the registry

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::services::Services;
use bioflow_dockstore::{conditions_from_json, Detail, QueryOptions, SearchRequest};
use bioflow_domain::QueryType;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

/// Parameters for registry search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// `[field, operator, term]` triples
    #[serde(default)]
    pub query: Vec<Value>,
    /// Phrase or wildcard matching
    #[serde(default)]
    pub query_type: QueryType,
    /// Phrase mode only: sloppy phrase matching
    #[serde(default)]
    pub sentence: bool,
    /// Results to keep
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Render every metadata field
    #[serde(default)]
    pub output_full: bool,
    /// Where to store the raw backend response
    #[serde(default)]
    pub save_results: Option<PathBuf>,
    /// Rerank timeout for this call
    #[serde(default)]
    pub rerank_timeout_secs: Option<u64>,
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_dockstore".to_string(),
        description: "Search the Dockstore workflow registry and return the best matches, \
            reranked for relevance when a rerank service is configured. \
            Fields: description, name, workflowName, author, organization, labels, content, \
            descriptorType, full_workflow_path."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "array",
                    "description": "Search conditions as [field, operator, term]; operator is AND or OR",
                    "items": {"type": "array", "items": {"type": "string"}, "minItems": 3, "maxItems": 3}
                },
                "query_type": {"type": "string", "enum": ["match_phrase", "wildcard"], "default": "match_phrase"},
                "sentence": {"type": "boolean", "default": false, "description": "Match terms as a sentence (phrase mode only)"},
                "top_n": {"type": "integer", "minimum": 1, "default": 3, "description": "Number of results to return"},
                "output_full": {"type": "boolean", "default": false, "description": "Include every metadata field"},
                "save_results": {"type": "string", "description": "Path to store the raw search response for dockstore_workflow_download"},
                "rerank_timeout_secs": {"type": "integer", "minimum": 1, "description": "Rerank timeout for this call"}
            },
            "required": ["query"]
        }),
    }
}

/// Handle search_dockstore tool invocation
pub async fn handle_search(services: &Services, params: SearchParams) -> Result<ToolCallResult, McpError> {
    if params.top_n == Some(0) {
        return Err(McpError::InvalidParams("top_n must be at least 1".to_string()));
    }
    if params.rerank_timeout_secs == Some(0) {
        return Err(McpError::InvalidParams("rerank_timeout_secs must be at least 1".to_string()));
    }

    let mut request = SearchRequest::new(conditions_from_json(&params.query));
    request.options = QueryOptions {
        query_type: params.query_type,
        sentence: params.sentence,
        size: services.result_size,
    };
    request.top_n = params.top_n.unwrap_or(services.default_top_n);
    request.detail = if params.output_full { Detail::Full } else { Detail::Concise };
    request.rerank_timeout = params.rerank_timeout_secs.map(Duration::from_secs);
    request.save_results = params.save_results;

    let outcome = services.search.search(&request).await?;

    let mut text = if outcome.is_empty() {
        "No workflows matched the search conditions".to_string()
    } else {
        outcome.rendered.to_text()
    };
    if let Some(reason) = &outcome.degraded {
        text.push_str(&format!(
            "\n\nNote: reranking unavailable ({}); results are in search backend order.",
            reason
        ));
    }
    if let Some(path) = &outcome.saved_to {
        text.push_str(&format!("\n\nRaw results saved to {}", path.display()));
    }

    let structured = json!({
        "query": outcome.query,
        "total_hits": outcome.total_hits,
        "results": outcome.rendered.links(),
        "degraded": outcome.degraded,
        "saved_to": outcome.saved_to,
    });
    Ok(ToolCallResult::text(text, Some(structured), false))
}
