//! Platform workflow tools - Validate, import, submit and monitor workflows
//!
//! Each tool builds one CLI command line and passes its output through. A
//! program that runs but exits non-zero yields an error result carrying the
//! captured output; a program that cannot be started is a protocol error.

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::services::Services;
use bioflow_platform::{
    import_status, import_workflow, run_status, submission_logs, submit_workflow, validate_inputs,
    validate_wdl, CliCommand, Credentials, ImportWorkflow, PlatformError, Session, SubmitWorkflow,
    ACCESS_KEY_VAR, SECRET_KEY_VAR,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Credentials and endpoint accepted by every platform tool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Auth {
    /// Access key; falls back to the environment
    #[serde(default)]
    pub ak: Option<String>,
    /// Secret key; falls back to the environment
    #[serde(default)]
    pub sk: Option<String>,
    /// Platform endpoint; falls back to the configured one
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Parameters for WDL validation
#[derive(Debug, Deserialize)]
pub struct ValidateWdlParams {
    /// WDL file
    pub wdl_path: String,
}

/// Parameters for inputs validation
#[derive(Debug, Deserialize)]
pub struct ValidateInputsParams {
    /// WDL file
    pub wdl_path: String,
    /// Inputs JSON file
    pub input_json: String,
}

/// Parameters for workflow import
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    /// What to import
    #[serde(flatten)]
    pub import: ImportWorkflow,
    /// Credentials and endpoint
    #[serde(flatten)]
    pub auth: Auth,
}

/// Parameters for workflow submission
#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    /// What to submit
    #[serde(flatten)]
    pub submit: SubmitWorkflow,
    /// Credentials and endpoint
    #[serde(flatten)]
    pub auth: Auth,
}

/// Parameters for a run status check
#[derive(Debug, Deserialize)]
pub struct RunStatusParams {
    /// Workspace name
    pub workspace_name: String,
    /// Submission ID
    pub submission_id: String,
    /// Credentials and endpoint
    #[serde(flatten)]
    pub auth: Auth,
}

/// Parameters for an import status check
#[derive(Debug, Deserialize)]
pub struct ImportStatusParams {
    /// Workspace name
    pub workspace_name: String,
    /// Workflow ID returned by the import
    pub workflow_id: String,
    /// Credentials and endpoint
    #[serde(flatten)]
    pub auth: Auth,
}

/// Parameters for log retrieval
#[derive(Debug, Deserialize)]
pub struct LogsParams {
    /// Workspace name
    pub workspace_name: String,
    /// Submission ID
    pub submission_id: String,
    /// Local directory for the logs
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Credentials and endpoint
    #[serde(flatten)]
    pub auth: Auth,
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Handle validate_wdl tool invocation
pub async fn handle_validate_wdl(services: &Services, params: ValidateWdlParams) -> Result<ToolCallResult, McpError> {
    require("wdl_path", &params.wdl_path)?;
    run(services, validate_wdl(&services.programs, &params.wdl_path)).await
}

/// Handle validate_workflow_input_json tool invocation
pub async fn handle_validate_inputs(
    services: &Services,
    params: ValidateInputsParams,
) -> Result<ToolCallResult, McpError> {
    require("wdl_path", &params.wdl_path)?;
    require("input_json", &params.input_json)?;
    run(
        services,
        validate_inputs(&services.programs, &params.wdl_path, &params.input_json),
    )
    .await
}

/// Handle import_workflow tool invocation
pub async fn handle_import(services: &Services, params: ImportParams) -> Result<ToolCallResult, McpError> {
    require("workspace_name", &params.import.workspace_name)?;
    require("workflow_name", &params.import.workflow_name)?;
    require("workflow_source", &params.import.workflow_source)?;
    let session = session(services, &params.auth)?;
    run(services, import_workflow(&services.programs, &session, &params.import)).await
}

/// Handle submit_workflow tool invocation
pub async fn handle_submit(services: &Services, params: SubmitParams) -> Result<ToolCallResult, McpError> {
    require("workspace_name", &params.submit.workspace_name)?;
    require("workflow_name", &params.submit.workflow_name)?;
    require("input_json", &params.submit.input_json)?;
    if params.submit.monitor_interval == Some(0) {
        return Err(PlatformError::InvalidArgument {
            name: "monitor_interval",
            reason: "must be at least 1 second".to_string(),
        }
        .into());
    }
    let session = session(services, &params.auth)?;
    run(services, submit_workflow(&services.programs, &session, &params.submit)).await
}

/// Handle check_workflow_run_status tool invocation
pub async fn handle_run_status(services: &Services, params: RunStatusParams) -> Result<ToolCallResult, McpError> {
    require("workspace_name", &params.workspace_name)?;
    require("submission_id", &params.submission_id)?;
    let session = session(services, &params.auth)?;
    run(
        services,
        run_status(&services.programs, &session, &params.workspace_name, &params.submission_id),
    )
    .await
}

/// Handle check_workflow_import_status tool invocation
pub async fn handle_import_status(
    services: &Services,
    params: ImportStatusParams,
) -> Result<ToolCallResult, McpError> {
    require("workspace_name", &params.workspace_name)?;
    require("workflow_id", &params.workflow_id)?;
    let session = session(services, &params.auth)?;
    run(
        services,
        import_status(&services.programs, &session, &params.workspace_name, &params.workflow_id),
    )
    .await
}

/// Handle get_workflow_logs tool invocation
pub async fn handle_logs(services: &Services, params: LogsParams) -> Result<ToolCallResult, McpError> {
    require("workspace_name", &params.workspace_name)?;
    require("submission_id", &params.submission_id)?;
    let session = session(services, &params.auth)?;
    run(
        services,
        submission_logs(
            &services.programs,
            &session,
            &params.workspace_name,
            &params.submission_id,
            &params.output_dir,
        ),
    )
    .await
}

fn require(name: &'static str, value: &str) -> Result<(), McpError> {
    if value.trim().is_empty() {
        return Err(PlatformError::InvalidArgument {
            name,
            reason: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

fn session(services: &Services, auth: &Auth) -> Result<Session, McpError> {
    let credentials = Credentials::resolve(auth.ak.as_deref(), auth.sk.as_deref())?;
    let endpoint = auth
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(&services.endpoint)
        .to_string();
    Ok(Session {
        credentials,
        endpoint,
    })
}

async fn run(services: &Services, command: CliCommand) -> Result<ToolCallResult, McpError> {
    match services.runner.run(&command).await {
        Ok(output) => {
            let combined = output.combined();
            let text = if combined.is_empty() {
                format!("{} completed successfully", command.program())
            } else {
                combined
            };
            Ok(ToolCallResult::text(
                text,
                Some(json!({
                    "command": command.to_string(),
                    "exit_code": output.status,
                    "stdout": output.stdout,
                    "stderr": output.stderr,
                })),
                false,
            ))
        }
        Err(PlatformError::CommandFailed {
            program,
            status,
            stdout,
            stderr,
        }) => {
            let structured = json!({
                "command": command.to_string(),
                "exit_code": status,
                "stdout": stdout,
                "stderr": stderr,
            });
            let failure = PlatformError::CommandFailed {
                program,
                status,
                stdout,
                stderr,
            };
            Ok(ToolCallResult::text(failure.to_string(), Some(structured), true))
        }
        Err(e) => Err(e.into()),
    }
}

fn auth_properties() -> Map<String, Value> {
    let schema = json!({
        "ak": {"type": "string", "description": format!("Access key; defaults to ${}", ACCESS_KEY_VAR)},
        "sk": {"type": "string", "description": format!("Secret key; defaults to ${}", SECRET_KEY_VAR)},
        "endpoint": {"type": "string", "description": "Platform endpoint; defaults to the configured endpoint"}
    });
    match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn definition(name: &str, description: &str, properties: Value, required: &[&str], with_auth: bool) -> ToolDefinition {
    let mut properties = match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if with_auth {
        properties.extend(auth_properties());
    }
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
    }
}

pub(crate) fn validate_wdl_definition() -> ToolDefinition {
    definition(
        "validate_wdl",
        "Validate a WDL file with womtool",
        json!({"wdl_path": {"type": "string", "description": "WDL file to validate"}}),
        &["wdl_path"],
        false,
    )
}

pub(crate) fn validate_inputs_definition() -> ToolDefinition {
    definition(
        "validate_workflow_input_json",
        "Validate an inputs JSON file against a WDL workflow with womtool",
        json!({
            "wdl_path": {"type": "string", "description": "WDL file"},
            "input_json": {"type": "string", "description": "Inputs JSON file"}
        }),
        &["wdl_path", "input_json"],
        false,
    )
}

pub(crate) fn import_definition() -> ToolDefinition {
    definition(
        "import_workflow",
        "Import a WDL workflow into a platform workspace",
        json!({
            "workspace_name": {"type": "string", "description": "Workspace name"},
            "workflow_name": {"type": "string", "description": "Workflow name"},
            "workflow_source": {"type": "string", "description": "Absolute path of the WDL file or directory"},
            "workflow_desc": {"type": "string", "description": "Workflow description"},
            "main_workflow_path": {"type": "string", "description": "Main WDL file when workflow_source is a directory"}
        }),
        &["workspace_name", "workflow_name", "workflow_source", "workflow_desc"],
        true,
    )
}

pub(crate) fn submit_definition() -> ToolDefinition {
    definition(
        "submit_workflow",
        "Submit an imported workflow run with an inputs JSON file",
        json!({
            "workspace_name": {"type": "string", "description": "Workspace name"},
            "workflow_name": {"type": "string", "description": "Workflow name"},
            "input_json": {"type": "string", "description": "Cromwell inputs JSON file"},
            "data_model_name": {"type": "string", "description": "Data model to generate"},
            "call_caching": {"type": "boolean", "default": false},
            "submission_desc": {"type": "string", "description": "Submission description"},
            "force_reupload": {"type": "boolean", "default": false},
            "mount_tos": {"type": "boolean", "default": false},
            "monitor": {"type": "boolean", "default": false, "description": "Wait until the run finishes"},
            "monitor_interval": {"type": "integer", "minimum": 1, "description": "Seconds between status polls"},
            "download_results": {"type": "boolean", "default": false},
            "download_dir": {"type": "string", "description": "Local directory for downloaded outputs"}
        }),
        &["workspace_name", "workflow_name", "input_json"],
        true,
    )
}

pub(crate) fn run_status_definition() -> ToolDefinition {
    definition(
        "check_workflow_run_status",
        "Check the status of a workflow submission",
        json!({
            "workspace_name": {"type": "string", "description": "Workspace name"},
            "submission_id": {"type": "string", "description": "Submission ID"}
        }),
        &["workspace_name", "submission_id"],
        true,
    )
}

pub(crate) fn import_status_definition() -> ToolDefinition {
    definition(
        "check_workflow_import_status",
        "Check the status of a workflow import",
        json!({
            "workspace_name": {"type": "string", "description": "Workspace name"},
            "workflow_id": {"type": "string", "description": "Workflow ID"}
        }),
        &["workspace_name", "workflow_id"],
        true,
    )
}

pub(crate) fn logs_definition() -> ToolDefinition {
    definition(
        "get_workflow_logs",
        "Download the logs of a workflow submission",
        json!({
            "workspace_name": {"type": "string", "description": "Workspace name"},
            "submission_id": {"type": "string", "description": "Submission ID"},
            "output_dir": {"type": "string", "default": ".", "description": "Directory for the logs"}
        }),
        &["workspace_name", "submission_id"],
        true,
    )
}
