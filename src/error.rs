use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::install::InstallStep;

/// Failures raised by the command runner
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("'{program}' was not found on PATH")]
    ExecutableNotFound { program: String },

    #[error("`{command}` exited with status {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    /// Exit code of a failed checked invocation, if that is what this is
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Outcomes the menu layer turns into a printed message
#[derive(Debug, Error)]
pub enum AssistError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("unparseable output from `{command}`: {source}")]
    MalformedOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no dependency manifest found in {}", root.display())]
    ManifestAbsent { root: PathBuf },

    #[error("{step} failed: {source}")]
    StepFailed {
        step: InstallStep,
        #[source]
        source: ExecError,
    },

    #[error("operation cancelled")]
    UserCancelled,
}

/// True when an error chain bottoms out in a user cancellation
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<AssistError>(),
        Some(AssistError::UserCancelled)
    )
}
