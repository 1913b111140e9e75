//! Error types for securefs-build.
//!
//! Two exit-code families exist:
//! - External command failures mirror the child's exit code.
//! - Everything that fails before or around a launch (bad arguments, missing
//!   toolchain, workspace or spawn errors) exits with [`TOOL_FAILURE_EXIT`].

use camino::Utf8PathBuf;
use thiserror::Error;

/// Exit code for failures of this tool itself, as opposed to a failing stage.
pub const TOOL_FAILURE_EXIT: u8 = 125;

/// The top-level error type for securefs-build operations.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Malformed command-line or configuration-file input.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input.
        message: String,
    },

    /// No toolchain root produced an existing toolchain file.
    #[error(
        "vcpkg toolchain file not found (searched: {candidates}). {hint}",
        candidates = format_searched(.searched)
    )]
    ToolchainNotFound {
        /// Every candidate file that was probed, in order.
        searched: Vec<Utf8PathBuf>,
        /// Remediation text shown to the user.
        hint: String,
    },

    /// The build workspace could not be created.
    #[error("cannot prepare build workspace {path}: {source}")]
    Workspace {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configure, build or test stage exited unsuccessfully.
    #[error("command failed with {}: {command}", describe_code(.code))]
    ExternalCommandFailed {
        /// The full command line that was attempted.
        command: String,
        /// The exit code, or `None` if the process was terminated by a signal.
        code: Option<i32>,
    },

    /// Anything else (spawn failures, non-UTF-8 paths, I/O).
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl BuildError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BuildError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::ExternalCommandFailed { code, .. } => child_exit_code(*code),
            _ => TOOL_FAILURE_EXIT,
        }
    }
}

/// Map a child's exit code onto a nonzero `u8`.
fn child_exit_code(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1)
}

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn format_searched(searched: &[Utf8PathBuf]) -> String {
    if searched.is_empty() {
        return "no candidates".to_string();
    }
    searched
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using BuildError.
pub type BuildResult<T> = Result<T, BuildError>;
