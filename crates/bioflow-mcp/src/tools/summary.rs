//! Summary tool - Describe every workflow in saved search results

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::services::Services;
use bioflow_dockstore::{
    find_latest_results, summarize_results, DockstoreError, RESULTS_FILE_NAME, SUMMARY_FILE_NAME,
};
use serde::Deserialize;
use serde_json::json;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Parameters for result summaries
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    /// Saved search response; the newest one under the working directory
    /// when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "result_summary".to_string(),
        description: format!(
            "Summarize every workflow in a saved search_dockstore response and write the summary \
             to {} next to it. Without a path, the most recent {} under the working directory is used.",
            SUMMARY_FILE_NAME, RESULTS_FILE_NAME
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Saved search response (see search_dockstore save_results)"}
            }
        }),
    }
}

/// Handle result_summary tool invocation
///
/// A missing results file is an error result, not a protocol error.
pub fn handle_summary(services: &Services, params: SummaryParams) -> Result<ToolCallResult, McpError> {
    let results_path = match params.path {
        Some(path) => path,
        None => {
            let root = std::env::current_dir()?;
            match find_latest_results(&root) {
                Some(path) => path,
                None => {
                    let e = DockstoreError::NoSavedResults {
                        file: RESULTS_FILE_NAME,
                        root,
                    };
                    return Ok(ToolCallResult::text(e.to_string(), None, true));
                }
            }
        }
    };

    let summary = match summarize_results(&results_path, services.search.formatter()) {
        Ok(summary) => summary,
        Err(DockstoreError::Io { path, source }) if source.kind() == ErrorKind::NotFound => {
            return Ok(ToolCallResult::text(
                format!("Results file not found: {}", path.display()),
                None,
                true,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ToolCallResult::text(
        summary.text.clone(),
        Some(json!({
            "results_path": summary.results_path,
            "summary_path": summary.summary_path,
            "workflows": summary.workflows,
        })),
        false,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_optional() {
        let params: SummaryParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.path.is_none());

        let params: SummaryParams = serde_json::from_value(json!({"path": "out/dockstore_results.json"})).unwrap();
        assert_eq!(params.path, Some(PathBuf::from("out/dockstore_results.json")));
    }
}
