//! Download tool - Write a workflow's WDL files from saved search results

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use bioflow_dockstore::{download_workflow, DockstoreError};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

/// Parameters for workflow download
#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    /// Saved search response written by search_dockstore
    pub json_file: PathBuf,
    /// `full_workflow_path` of the workflow
    pub workflow_path: String,
    /// Directory the workflow folder is created in
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "dockstore_workflow_download".to_string(),
        description: "Write the WDL files of one workflow from a saved search_dockstore response".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "json_file": {"type": "string", "description": "Saved search response (see search_dockstore save_results)"},
                "workflow_path": {"type": "string", "description": "Workflow path, e.g. github.com/org/repo/name"},
                "output_dir": {"type": "string", "default": ".", "description": "Directory to write into"}
            },
            "required": ["json_file", "workflow_path"]
        }),
    }
}

/// Handle dockstore_workflow_download tool invocation
///
/// An unknown workflow or one without WDL files is an error result, not a
/// protocol error.
pub fn handle_download(params: DownloadParams) -> Result<ToolCallResult, McpError> {
    let downloaded = match download_workflow(&params.json_file, &params.workflow_path, &params.output_dir) {
        Ok(downloaded) => downloaded,
        Err(e @ (DockstoreError::WorkflowNotFound(_) | DockstoreError::NoWdlFiles(_))) => {
            return Ok(ToolCallResult::text(e.to_string(), None, true));
        }
        Err(e) => return Err(e.into()),
    };

    let files: Vec<String> = downloaded
        .files
        .iter()
        .map(|f| f.display().to_string())
        .collect();
    let text = format!(
        "Wrote {} WDL file(s) to {}:\n{}",
        files.len(),
        downloaded.directory.display(),
        files.join("\n")
    );
    Ok(ToolCallResult::text(
        text,
        Some(json!({
            "workflow_path": downloaded.workflow_path,
            "directory": downloaded.directory,
            "files": files,
        })),
        false,
    ))
}
