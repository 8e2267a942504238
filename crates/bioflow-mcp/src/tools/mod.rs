//! MCP tool implementations

mod compose;
mod docker;
mod download;
mod search;
mod summary;
mod workflow;

pub use compose::{handle_compose, ComposeParams};
pub use docker::{handle_image_url, ImageUrlParams};
pub use download::{handle_download, DownloadParams};
pub use search::{handle_search, SearchParams};
pub use summary::{handle_summary, SummaryParams};
pub use workflow::{
    handle_import, handle_import_status, handle_logs, handle_run_status, handle_submit,
    handle_validate_inputs, handle_validate_wdl, Auth, ImportParams, ImportStatusParams,
    LogsParams, RunStatusParams, SubmitParams, ValidateInputsParams, ValidateWdlParams,
};

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::services::Services;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Definitions of every tool, in `tools/list` order
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        compose::definition(),
        search::definition(),
        download::definition(),
        summary::definition(),
        workflow::validate_wdl_definition(),
        workflow::validate_inputs_definition(),
        workflow::import_definition(),
        workflow::submit_definition(),
        workflow::run_status_definition(),
        workflow::import_status_definition(),
        workflow::logs_definition(),
        docker::definition(),
    ]
}

/// Route a tool call to its handler
pub async fn call(services: &Services, name: &str, arguments: Value) -> Result<ToolCallResult, McpError> {
    match name {
        "compose_input_json" => handle_compose(parse(name, arguments)?),
        "search_dockstore" => handle_search(services, parse(name, arguments)?).await,
        "dockstore_workflow_download" => handle_download(parse(name, arguments)?),
        "result_summary" => handle_summary(services, parse(name, arguments)?),
        "validate_wdl" => handle_validate_wdl(services, parse(name, arguments)?).await,
        "validate_workflow_input_json" => handle_validate_inputs(services, parse(name, arguments)?).await,
        "import_workflow" => handle_import(services, parse(name, arguments)?).await,
        "submit_workflow" => handle_submit(services, parse(name, arguments)?).await,
        "check_workflow_run_status" => handle_run_status(services, parse(name, arguments)?).await,
        "check_workflow_import_status" => handle_import_status(services, parse(name, arguments)?).await,
        "get_workflow_logs" => handle_logs(services, parse(name, arguments)?).await,
        "get_docker_image_url" => handle_image_url(services, parse(name, arguments)?),
        _ => Err(McpError::ToolNotFound(name.to_string())),
    }
}

/// Deserialize tool arguments; a missing argument object counts as empty
fn parse<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| McpError::invalid_params(tool, e))
}
