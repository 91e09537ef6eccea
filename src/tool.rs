use crate::{BuildError, BuildError::ExternalToolLaunchError};
use std::{
    fmt::{Debug, Display, Formatter},
    path::{Path, PathBuf},
    process::Command,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// One external tool run: what to start, where, and with which argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub working_dir: PathBuf,
    /// The whole argument string, exactly as the tool expects it on its command line
    pub args: String,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>, args: impl Into<String>) -> Self {
        Self { program: program.into(), working_dir: working_dir.into(), args: args.into() }
    }

    pub fn tool_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

impl Display for ToolInvocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.program.to_string_lossy(), self.args)
    }
}

/// Whether an expected output file was there once the tool exited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCheck {
    pub path: PathBuf,
    pub exists: bool,
}

/// What happened when a tool ran to completion
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub invocation: ToolInvocation,
    /// `None` when the process was terminated without an exit code (e.g. by a signal)
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub artifact: Option<ArtifactCheck>,
}

impl ToolOutcome {
    pub fn new(invocation: ToolInvocation, exit_code: Option<i32>, duration: Duration) -> Self {
        Self { invocation, exit_code, duration, artifact: None }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Path of the expected artifact, only if it was found after the tool exited
    pub fn artifact(&self) -> Option<&Path> {
        match &self.artifact {
            Some(check) if check.exists => Some(&check.path),
            _ => None,
        }
    }

    pub(crate) fn with_artifact_check(mut self, path: PathBuf) -> Self {
        let exists = path.exists();
        self.artifact = Some(ArtifactCheck { path, exists });
        self
    }

    /// Turn a non-zero exit into an error, for callers that want strict checking
    pub fn ensure_success(self, reason: &str) -> Result<Self, BuildError> {
        if self.success() {
            Ok(self)
        } else {
            Err(BuildError::ExternalToolError {
                reason: reason.to_string(),
                tool: self.invocation.tool_name(),
                args: self.invocation.args.clone(),
                exit_code: self.exit_code,
            })
        }
    }

    /// Turn a failed artifact check into an error naming `unit`.
    ///
    /// Only outcomes of [`Builder::build_module`](crate::Builder::build_module) carry an artifact check.
    pub fn ensure_artifact(self, unit: &str) -> Result<PathBuf, BuildError> {
        match self.artifact {
            Some(ArtifactCheck { path, exists: true }) => Ok(path),
            Some(ArtifactCheck { path, exists: false }) => {
                Err(BuildError::MissingArtifact { module: unit.to_string(), path })
            },
            None => Err(BuildError::NoArtifactCheck { tool: self.invocation.tool_name() }),
        }
    }
}

/// Starts external tools and waits for them
pub trait ToolRunner: Debug {
    /// Run `invocation` to completion. Failing to start the tool is an error, any exit status is not.
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, BuildError>;
}

/// Runs tools as child processes sharing our stdin/stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, BuildError> {
        info!("{} (in {})", invocation, invocation.working_dir.to_string_lossy());

        let mut command = Command::new(&invocation.program);
        command.current_dir(&invocation.working_dir);
        push_args(&mut command, &invocation.args);

        let start = Instant::now();
        let status = command
            .status()
            .map_err(|e| ExternalToolLaunchError { tool: invocation.tool_name(), inner: e })?;
        let duration = start.elapsed();

        debug!("`{}` finished with {} after {:.2?}", invocation.tool_name(), status, duration);
        Ok(ToolOutcome::new(invocation.clone(), status.code(), duration))
    }
}

#[cfg(windows)]
fn push_args(command: &mut Command, args: &str) {
    use std::os::windows::process::CommandExt;

    if !args.is_empty() {
        command.raw_arg(args);
    }
}

#[cfg(not(windows))]
fn push_args(command: &mut Command, args: &str) {
    command.args(split_args(args));
}

/// Split a command line the way a shell would, so quoted arguments keep their spaces
#[cfg(not(windows))]
fn split_args(args: &str) -> Vec<String> {
    match shlex::split(args) {
        Some(split) => split,
        None => {
            warn!("Unbalanced quotes in `{}`, splitting on whitespace", args);
            args.split_whitespace().map(str::to_string).collect()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: Option<i32>) -> ToolOutcome {
        ToolOutcome::new(ToolInvocation::new("zip", "out", "-r a.zip b"), exit_code, Duration::from_millis(5))
    }

    #[test]
    fn success_requires_zero_exit_code() {
        assert!(outcome(Some(0)).success());
        assert!(!outcome(Some(2)).success());
        assert!(!outcome(None).success());
    }

    #[test]
    fn ensure_success_reports_tool_and_args() {
        let err = outcome(Some(12)).ensure_success("archiving failed").unwrap_err();
        match err {
            BuildError::ExternalToolError { reason, tool, args, exit_code } => {
                assert_eq!(reason, "archiving failed");
                assert_eq!(tool, "zip");
                assert_eq!(args, "-r a.zip b");
                assert_eq!(exit_code, Some(12));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn artifact_only_reported_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("fun.dll");
        std::fs::write(&present, b"MZ").unwrap();

        let found = outcome(Some(1)).with_artifact_check(present.clone());
        assert_eq!(found.artifact(), Some(present.as_path()));

        let missing = outcome(Some(0)).with_artifact_check(dir.path().join("gone.dll"));
        assert_eq!(missing.artifact(), None);
        assert!(matches!(missing.ensure_artifact("fun"), Err(BuildError::MissingArtifact { .. })));
        assert!(outcome(Some(0)).artifact().is_none());
    }

    #[test]
    fn unchecked_outcome_has_no_artifact_to_report() {
        let err = outcome(Some(0)).ensure_artifact("base").unwrap_err();
        assert!(matches!(&err, BuildError::NoArtifactCheck { tool } if tool == "zip"));
        assert!(!err.to_string().contains("expected"));
    }

    #[cfg(not(windows))]
    #[test]
    fn quoted_arguments_keep_their_spaces() {
        assert_eq!(
            split_args(r#""my plugins/foo.sma" -o"out dir/x.amxx" -d2"#),
            ["my plugins/foo.sma", "-oout dir/x.amxx", "-d2"]
        );
        assert_eq!(split_args("admin.sma"), ["admin.sma"]);
        assert_eq!(split_args("-r \"unterminated"), ["-r", "\"unterminated"]);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_passes_quoted_arguments_whole() {
        let dir = tempfile::tempdir().unwrap();
        let args = r#"-c 'printf "%s\n" "$@" > args.txt' sh "my plugins/foo.sma" -o"out dir/x.amxx""#;
        let outcome = SystemRunner.run(&ToolInvocation::new("sh", dir.path(), args)).unwrap();
        assert!(outcome.success());

        let written = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert_eq!(written, "my plugins/foo.sma\n-oout dir/x.amxx\n");
    }

    #[test]
    fn display_shows_command_line() {
        assert_eq!(outcome(Some(0)).invocation.to_string(), "zip -r a.zip b");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_code_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let ok = SystemRunner.run(&ToolInvocation::new("true", dir.path(), "")).unwrap();
        assert_eq!(ok.exit_code(), Some(0));

        let failed = SystemRunner.run(&ToolInvocation::new("false", dir.path(), "")).unwrap();
        assert_eq!(failed.exit_code(), Some(1));
        assert!(!failed.success());
    }

    #[test]
    fn system_runner_fails_to_launch_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-tool.exe");
        let err = SystemRunner.run(&ToolInvocation::new(&missing, dir.path(), "x.sma")).unwrap_err();
        assert!(matches!(err, BuildError::ExternalToolLaunchError { .. }));
    }
}
