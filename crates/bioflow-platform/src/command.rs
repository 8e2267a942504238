//! Platform CLI command lines
//!
//! Builders for the validator, import, submission, status and log CLIs.
//! Secret values are tracked per argument so a command can be logged or
//! shown without leaking keys.

use crate::credentials::Credentials;
use serde::Deserialize;
use std::fmt;

/// Default platform endpoint
pub const DEFAULT_ENDPOINT: &str = "https://bio-top.miracle.ac.cn";

/// Names (or paths) of the external programs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgramNames {
    /// WDL and inputs validator
    pub womtool: String,
    /// Workflow submission CLI
    pub bw: String,
    /// Workflow import CLI
    pub bw_import: String,
    /// Submission status CLI
    pub bw_status_check: String,
    /// Import status CLI
    pub bw_import_status_check: String,
    /// Submission log fetcher
    pub get_submission_logs: String,
}

impl Default for ProgramNames {
    fn default() -> Self {
        Self {
            womtool: "womtool".to_string(),
            bw: "bw".to_string(),
            bw_import: "bw_import".to_string(),
            bw_status_check: "bw_status_check".to_string(),
            bw_import_status_check: "bw_import_status_check".to_string(),
            get_submission_logs: "get_submission_logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Plain(String),
    Secret(String),
}

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCommand {
    program: String,
    args: Vec<Arg>,
}

impl CliCommand {
    /// Start a command line for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(value.into()));
        self
    }

    /// Append `--name value`
    pub fn opt(self, name: &str, value: impl Into<String>) -> Self {
        self.arg(name).arg(value)
    }

    /// Append `--name value` when a value is given
    pub fn opt_if(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.opt(name, value),
            None => self,
        }
    }

    /// Append a bare flag when `enabled`
    pub fn flag_if(self, name: &str, enabled: bool) -> Self {
        if enabled {
            self.arg(name)
        } else {
            self
        }
    }

    /// Append `--name value` with a value that must never be displayed
    pub fn secret(mut self, name: &str, value: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(name.to_string()));
        self.args.push(Arg::Secret(value.into()));
        self
    }

    /// Program to execute
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments as passed to the process
    pub fn args(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(|a| match a {
                Arg::Plain(v) | Arg::Secret(v) => v.as_str(),
            })
            .collect()
    }
}

/// Shell-like rendering with secrets replaced by `***`
impl fmt::Display for CliCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            match arg {
                Arg::Plain(v) if v.is_empty() || v.contains(char::is_whitespace) => {
                    write!(f, " '{}'", v)?
                }
                Arg::Plain(v) => write!(f, " {}", v)?,
                Arg::Secret(_) => f.write_str(" ***")?,
            }
        }
        Ok(())
    }
}

/// Authenticated target of a platform call
#[derive(Debug, Clone)]
pub struct Session {
    /// Keys passed with every call
    pub credentials: Credentials,
    /// Platform endpoint
    pub endpoint: String,
}

impl Session {
    /// Start a command line for `program` with credentials and endpoint attached
    fn command(&self, program: &str) -> CliCommand {
        CliCommand::new(program)
            .secret("--ak", self.credentials.access_key())
            .secret("--sk", self.credentials.secret_key())
            .opt("--endpoint", self.endpoint.as_str())
    }
}

/// Workflow import arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportWorkflow {
    /// Target workspace
    pub workspace_name: String,
    /// Name the workflow is registered under
    pub workflow_name: String,
    /// WDL file or directory to upload
    pub workflow_source: String,
    /// Workflow description
    pub workflow_desc: String,
    /// Main WDL file when the source is a directory
    #[serde(default, alias = "main_workflow_path")]
    pub main_path: Option<String>,
}

/// Workflow submission arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitWorkflow {
    /// Target workspace
    pub workspace_name: String,
    /// Imported workflow to run
    pub workflow_name: String,
    /// Cromwell inputs file
    pub input_json: String,
    /// Data model to generate on the platform
    #[serde(default)]
    pub data_model_name: Option<String>,
    /// Enable call caching
    #[serde(default)]
    pub call_caching: bool,
    /// Submission description
    #[serde(default)]
    pub submission_desc: Option<String>,
    /// Re-upload files already present in object storage
    #[serde(default)]
    pub force_reupload: bool,
    /// Mount object storage
    #[serde(default)]
    pub mount_tos: bool,
    /// Wait for the run to finish
    #[serde(default)]
    pub monitor: bool,
    /// Seconds between status polls while monitoring
    #[serde(default)]
    pub monitor_interval: Option<u64>,
    /// Download outputs when finished
    #[serde(default)]
    pub download_results: bool,
    /// Local directory for downloaded outputs
    #[serde(default)]
    pub download_dir: Option<String>,
}

/// `womtool validate <wdl>`
pub fn validate_wdl(programs: &ProgramNames, wdl_path: &str) -> CliCommand {
    CliCommand::new(&programs.womtool).arg("validate").arg(wdl_path)
}

/// `womtool validate <wdl> --inputs <json>`
pub fn validate_inputs(programs: &ProgramNames, wdl_path: &str, input_json: &str) -> CliCommand {
    validate_wdl(programs, wdl_path).opt("--inputs", input_json)
}

/// `bw_import ...`
pub fn import_workflow(programs: &ProgramNames, session: &Session, import: &ImportWorkflow) -> CliCommand {
    session
        .command(&programs.bw_import)
        .opt("--workspace_name", import.workspace_name.as_str())
        .opt("--workflow_name", import.workflow_name.as_str())
        .opt("--workflow_source", import.workflow_source.as_str())
        .opt("--workflow_desc", import.workflow_desc.as_str())
        .opt_if("--main_path", non_blank(&import.main_path))
}

/// `bw ...` with only the optional flags that were requested
pub fn submit_workflow(programs: &ProgramNames, session: &Session, submit: &SubmitWorkflow) -> CliCommand {
    session
        .command(&programs.bw)
        .opt("--workspace_name", submit.workspace_name.as_str())
        .opt("--workflow_name", submit.workflow_name.as_str())
        .opt("--input_json", submit.input_json.as_str())
        .opt_if("--data_model_name", non_blank(&submit.data_model_name))
        .flag_if("--call_caching", submit.call_caching)
        .opt_if("--submission_desc", non_blank(&submit.submission_desc))
        .flag_if("--force_reupload", submit.force_reupload)
        .flag_if("--mount_tos", submit.mount_tos)
        .flag_if("--monitor", submit.monitor)
        .opt_if("--monitor_interval", submit.monitor_interval.map(|s| s.to_string()))
        .flag_if("--download_results", submit.download_results)
        .opt_if("--download_dir", non_blank(&submit.download_dir))
}

/// `bw_status_check ... --submission_id <id>`
pub fn run_status(programs: &ProgramNames, session: &Session, workspace_name: &str, submission_id: &str) -> CliCommand {
    session
        .command(&programs.bw_status_check)
        .opt("--workspace_name", workspace_name)
        .opt("--submission_id", submission_id)
}

/// `bw_import_status_check ... --workflow_id <id>`
pub fn import_status(programs: &ProgramNames, session: &Session, workspace_name: &str, workflow_id: &str) -> CliCommand {
    session
        .command(&programs.bw_import_status_check)
        .opt("--workspace_name", workspace_name)
        .opt("--workflow_id", workflow_id)
}

/// `get_submission_logs ...`; `--output_dir` only when it is not `.`
pub fn submission_logs(
    programs: &ProgramNames,
    session: &Session,
    workspace_name: &str,
    submission_id: &str,
    output_dir: &str,
) -> CliCommand {
    let output_dir = Some(output_dir).filter(|d| !d.is_empty() && *d != ".");
    session
        .command(&programs.get_submission_logs)
        .opt("--workspace_name", workspace_name)
        .opt("--submission_id", submission_id)
        .opt_if("--output_dir", output_dir)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
