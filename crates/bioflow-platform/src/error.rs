//! Error types for platform CLI calls

use thiserror::Error;

/// Errors from resolving credentials or running platform CLIs
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Credential neither supplied nor set in the environment
    #[error("missing credential: pass `{argument}` or set {variable}")]
    MissingCredential {
        /// Tool argument that can carry the value
        argument: &'static str,
        /// Environment variable consulted as fallback
        variable: &'static str,
    },

    /// Argument failed validation
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Program is not installed or not on PATH
    #[error("program not found: {program}")]
    ProgramNotFound {
        /// Program name
        program: String,
    },

    /// Program exited unsuccessfully
    #[error("{program} failed ({}){}", exit_label(.status), output_suffix(.stdout, .stderr))]
    CommandFailed {
        /// Program name
        program: String,
        /// Exit code, absent when killed by a signal
        status: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// Program did not finish in time
    #[error("{program} timed out after {secs} seconds")]
    Timeout {
        /// Program name
        program: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// Program could not be started
    #[error("failed to run {program}: {source}")]
    Io {
        /// Program name
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl PlatformError {
    /// Whether the caller can fix this by changing the arguments
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlatformError::MissingCredential { .. } | PlatformError::InvalidArgument { .. }
        )
    }
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn output_suffix(stdout: &str, stderr: &str) -> String {
    let mut suffix = String::new();
    if !stdout.trim().is_empty() {
        suffix.push_str(&format!("\nstdout:\n{}", stdout.trim_end()));
    }
    if !stderr.trim().is_empty() {
        suffix.push_str(&format!("\nstderr:\n{}", stderr.trim_end()));
    }
    suffix
}

/// Result alias for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
