//! Bioflow Platform
//!
//! Thin wrappers around the analysis platform's command-line tools: the
//! WDL validator, workflow import and submission, status checks and log
//! retrieval. Each wrapper builds a [`CliCommand`] that a [`CommandRunner`]
//! executes; output is passed through unchanged.

pub mod command;
pub mod credentials;
pub mod docker;
pub mod error;
pub mod runner;

pub use command::{
    import_status, import_workflow, run_status, submission_logs, submit_workflow, validate_inputs,
    validate_wdl, CliCommand, ImportWorkflow, ProgramNames, Session, SubmitWorkflow,
    DEFAULT_ENDPOINT,
};
pub use credentials::{Credentials, ACCESS_KEY_VAR, SECRET_KEY_VAR};
pub use docker::ImageRegistry;
pub use error::{PlatformError, Result};
pub use runner::{CommandOutput, CommandRunner, TokioCommandRunner};
