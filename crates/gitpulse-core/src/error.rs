//! Error types for tool invocations, analyses and discovery.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Errors raised while invoking the external version-control tool.
#[derive(Debug, Error)]
pub enum GitError {
    /// The tool binary could not be found or executed at all.
    #[error("Git is not installed or not available in PATH ({program})")]
    ToolUnavailable { program: String },

    /// The process could not be spawned for a reason other than a missing binary.
    #[error("Failed to run {program} in {cwd}: {source}")]
    Spawn {
        program: String,
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("`git {args}` failed in {cwd} ({status}): {stderr}")]
    CommandFailed {
        args: String,
        cwd: PathBuf,
        status: String,
        stderr: String,
    },

    /// Output exceeded the configured buffer.
    #[error("`git {args}` produced more than {limit} bytes of output")]
    OutputTooLarge { args: String, limit: usize },

    /// The directory is not inside a repository the tool recognizes.
    #[error("{} is not a git repository", path.display())]
    NotARepository { path: PathBuf },

    /// The tool did not finish within the configured timeout.
    #[error("`git {args}` timed out after {after:?}")]
    Timeout { args: String, after: Duration },

    /// Output could not be interpreted (e.g. a non-numeric commit count).
    #[error("Unexpected output from `git {args}`: {message}")]
    InvalidOutput { args: String, message: String },
}

impl GitError {
    /// Classify a spawn error, mapping a missing binary to `ToolUnavailable`.
    pub fn spawn(program: &str, cwd: impl Into<PathBuf>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::ToolUnavailable {
                program: program.to_string(),
            },
            _ => Self::Spawn {
                program: program.to_string(),
                cwd: cwd.into(),
                source,
            },
        }
    }

    /// The failure category this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ToolUnavailable { .. } => FailureKind::ToolUnavailable,
            Self::InvalidOutput { .. } => FailureKind::ParseAnomaly,
            _ => FailureKind::RetrievalFailure,
        }
    }
}

/// Category of a recovered failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// The external tool could not be invoked.
    ToolUnavailable,
    /// An invocation failed (invalid repository, permissions, buffer overrun, timeout).
    RetrievalFailure,
    /// Tool output could not be interpreted.
    ParseAnomaly,
}

/// A failure that was recovered from by degrading to an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub message: String,
}

impl AnalysisFailure {
    /// Create a new failure record.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&GitError> for AnalysisFailure {
    fn from(err: &GitError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<GitError> for AnalysisFailure {
    fn from(err: GitError) -> Self {
        Self::from(&err)
    }
}

/// Kind of discovery warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error listing a directory.
    ReadError,
}

/// Non-fatal warning encountered during discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from an I/O error, classifying permission problems.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self {
                message: format!("Permission denied: {}", path.display()),
                path,
                kind: WarningKind::PermissionDenied,
            },
            _ => Self {
                message: format!("Read error: {error}"),
                path,
                kind: WarningKind::ReadError,
            },
        }
    }
}
