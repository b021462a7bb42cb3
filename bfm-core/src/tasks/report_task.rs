//! src/tasks/report_task.rs
//! Failure reports for external commands.
//!
//! Captured file operations report through the error queue. Commands that
//! owned the terminal, and plugins that never exited normally, get an
//! `M-ERROR-` report file that is shown in the pager.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::tasks::process_task::{ProcessRequest, RunOutcome, StdioMode};

/// Error-queue message for a failed captured run.
pub fn run_error_message(msg: &str, outcome: &RunOutcome) -> String {
    format!(
        "{msg} with cmd:\n\n\t{}\n\nSTDOUT\n======\n\n{}\n\nSTDERR\n======\n\n\t{}\n",
        outcome.full_command, outcome.stdout, outcome.stderr
    )
}

fn indented(text: &str) -> String {
    text.lines().map(|l| format!("  {l}\n")).collect()
}

/// Report body for a failed command.
pub fn command_report(outcome: &RunOutcome) -> String {
    let mut doc = String::new();
    doc.push_str("Error running:\n\n");
    doc.push_str(&format!("  {}\n\n", outcome.full_command));
    doc.push_str("STDERR:\n");
    doc.push_str(&indented(&outcome.stderr));
    if outcome.stderr.is_empty() {
        doc.push_str(&format!("  ({})\n", outcome.failure_reason()));
    }
    doc
}

/// Report body for a plugin that crashed or could not start.
pub fn plugin_report(plugin: &Path, outcome: &RunOutcome) -> String {
    let mut doc = String::new();
    doc.push_str("Error running:\n\n");
    doc.push_str(&format!("  {}\n\n", plugin.display()));
    doc.push_str(&format!("  ({})\n\n", outcome.failure_reason()));
    doc.push_str("STDOUT:\n");
    doc.push_str(&indented(&outcome.stdout));
    doc.push_str("STDERR:\n");
    doc.push_str(&indented(&outcome.stderr));
    doc
}

/// Persist `body` as an `M-ERROR-` file in `dir`. The file lives as long as
/// the returned path.
pub fn write_report(dir: &Path, body: &str) -> AppResult<TempPath> {
    let mut file = Builder::new()
        .prefix("M-ERROR-")
        .tempfile_in(dir)
        .map_err(|e| AppError::file_operation_failed("create report", dir, e.to_string()))?;

    file.write_all(body.as_bytes())?;
    let path = file.into_temp_path();
    info!("Created TMP File: {}", path.display());
    Ok(path)
}

/// Pager invocation for a report. Errors are expected so a missing pager
/// cannot produce another report.
pub fn pager_request(pager: &str, report: &Path, cwd: PathBuf) -> ProcessRequest {
    ProcessRequest::new(
        "bash",
        [
            "-c".to_string(),
            format!("LESS=IR {pager} '{}'", report.display()),
        ],
        StdioMode::Terminal,
    )
    .in_dir(cwd)
    .expecting_errors()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::process_task::RunStatus;
    use tempfile::TempDir;

    fn outcome() -> RunOutcome {
        RunOutcome {
            full_command: "mv /a/x /b".into(),
            status: RunStatus::Exited(1),
            stdout: "".into(),
            stderr: "mv: cannot move\nsecond line\n".into(),
        }
    }

    #[test]
    fn test_run_error_message_layout() {
        let msg = run_error_message("Error moving files", &outcome());
        assert!(msg.starts_with("Error moving files with cmd:\n\n\tmv /a/x /b\n\nSTDOUT\n======\n"));
        assert!(msg.contains("STDERR\n======\n\n\tmv: cannot move"));
    }

    #[test]
    fn test_command_report_indents_stderr() {
        let report = command_report(&outcome());
        assert_eq!(
            report,
            "Error running:\n\n  mv /a/x /b\n\nSTDERR:\n  mv: cannot move\n  second line\n"
        );
    }

    #[test]
    fn test_report_file_removed_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_report(temp_dir.path(), "body").unwrap();
        let on_disk = path.to_path_buf();

        assert!(on_disk.file_name().unwrap().to_string_lossy().starts_with("M-ERROR-"));
        assert_eq!(std::fs::read_to_string(&on_disk).unwrap(), "body");

        let req = pager_request("less", &on_disk, temp_dir.path().to_path_buf());
        assert!(req.error_expected);
        assert!(req.args[1].starts_with("LESS=IR less '"));

        drop(path);
        assert!(!on_disk.exists());
    }
}
