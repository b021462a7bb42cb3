//! src/tasks/process_task.rs
//! ============================================================================
//! # Process runner
//!
//! External programs are described by a [`ProcessRequest`] and executed by a
//! [`ProcessRunner`]. Captured runs buffer stdout and stderr; terminal runs
//! hand the terminal to the child and optionally capture stderr for the
//! error report.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// stdout and stderr buffered, stdin closed.
    Captured,

    /// Child owns the terminal.
    Terminal,

    /// Child owns the terminal; stderr is buffered.
    TerminalCaptureStderr,
}

impl StdioMode {
    pub const fn is_interactive(self) -> bool {
        !matches!(self, Self::Captured)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdio: StdioMode,

    /// A failing exit is expected and must not produce an error report.
    pub error_expected: bool,
}

impl ProcessRequest {
    pub fn new<I, S>(program: impl Into<String>, args: I, stdio: StdioMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            stdio,
            error_expected: false,
        }
    }

    pub fn captured<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(program, args, StdioMode::Captured)
    }

    pub fn terminal<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(program, args, StdioMode::TerminalCaptureStderr)
    }

    #[must_use]
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub const fn expecting_errors(mut self) -> Self {
        self.error_expected = true;
        self
    }

    /// Program and arguments joined by spaces, for messages and logs.
    pub fn full_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Exited(i32),

    /// Terminated by a signal; no exit code.
    Signaled,

    SpawnFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub full_command: String,
    pub status: RunStatus,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Exited(0))
    }

    /// The child ran to completion, whatever its exit code.
    pub const fn exited(&self) -> bool {
        matches!(self.status, RunStatus::Exited(_))
    }

    /// One-line description of a failure.
    pub fn failure_reason(&self) -> String {
        match &self.status {
            RunStatus::Exited(code) => format!("exit status {code}"),
            RunStatus::Signaled => "terminated by signal".to_string(),
            RunStatus::SpawnFailed(e) => e.clone(),
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, request: &ProcessRequest) -> RunOutcome;
}

/// `tokio::process` backed runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    fn command(request: &ProcessRequest) -> Command {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        match request.stdio {
            StdioMode::Captured => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            StdioMode::Terminal => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            StdioMode::TerminalCaptureStderr => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::piped());
            }
        }
        cmd
    }

    fn status_of(status: ExitStatus) -> RunStatus {
        status.code().map_or(RunStatus::Signaled, RunStatus::Exited)
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, request: &ProcessRequest) -> RunOutcome {
        let full_command = request.full_command();
        let start_time = Instant::now();
        debug!("Running {}", full_command);

        let output = match Self::command(request).output().await {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn {}: {}", request.program, e);
                return RunOutcome {
                    full_command,
                    status: RunStatus::SpawnFailed(format!(
                        "Failed to spawn {}: {}",
                        request.program, e
                    )),
                    stdout: String::new(),
                    stderr: String::new(),
                };
            }
        };

        let outcome = RunOutcome {
            full_command,
            status: Self::status_of(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        info!(
            marker = "PROCESS_FINISHED",
            success = outcome.is_success(),
            "{} finished ({}) in {:?}",
            outcome.full_command,
            outcome.failure_reason(),
            start_time.elapsed()
        );

        outcome
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_command() {
        let req = ProcessRequest::captured("mv", ["/a/x", "/b"]);
        assert_eq!(req.full_command(), "mv /a/x /b");
        assert!(!req.stdio.is_interactive());
        assert!(ProcessRequest::terminal("vim", ["f"]).stdio.is_interactive());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captured_run_collects_output_and_code() {
        let req = ProcessRequest::captured("sh", ["-c", "echo out; echo err >&2; exit 3"]);
        let outcome = SystemProcessRunner.run(&req).await;

        assert_eq!(outcome.status, RunStatus::Exited(3));
        assert!(!outcome.is_success());
        assert!(outcome.exited());
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_is_not_an_exit() {
        let req = ProcessRequest::captured("sh", ["-c", "kill -9 $$"]);
        let outcome = SystemProcessRunner.run(&req).await;
        assert_eq!(outcome.status, RunStatus::Signaled);
        assert!(!outcome.exited());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let req = ProcessRequest::captured("/nonexistent/bfm-test-program", Vec::<String>::new());
        let outcome = SystemProcessRunner.run(&req).await;
        assert!(matches!(outcome.status, RunStatus::SpawnFailed(_)));
        assert!(outcome.failure_reason().contains("Failed to spawn"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_requested_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path().canonicalize().unwrap();
        let req = ProcessRequest::captured("pwd", Vec::<String>::new()).in_dir(&dir);
        let outcome = SystemProcessRunner.run(&req).await;
        assert_eq!(outcome.stdout.trim(), dir.to_string_lossy());
    }
}
