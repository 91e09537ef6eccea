use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors that happen while driving the external release tools
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{reason}: {tool:?} {args:?} (exit code {exit_code:?})")]
    ExternalToolError {
        reason: String,
        tool: String,
        args: String,
        exit_code: Option<i32>,
    },
    #[error("failed to launch external tool `{tool}`: {inner}")]
    ExternalToolLaunchError { tool: String, inner: io::Error },
    #[error("module {module} produced no output (expected {path})")]
    MissingArtifact { module: String, path: PathBuf },
    #[error("`{tool}` has no expected artifact to check")]
    NoArtifactCheck { tool: String },
    #[error("failed to remove stale artifact {path}: {inner}")]
    RemovingStaleArtifact { path: PathBuf, inner: io::Error },
    #[error("internal I/O error: {0}")]
    InternalIoError(#[from] io::Error),
}
