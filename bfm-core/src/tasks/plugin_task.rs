//! src/tasks/plugin_task.rs
//! ============================================================================
//! # Plugin protocol
//!
//! A plugin is an executable `<plugins_dir>/<name>` started as
//!
//! ```text
//! <plugin> <command-file> <state-file> [args...]
//! ```
//!
//! The state file (`M-STATE-*`) holds the current directory on its first
//! line, then the absolute path of every selected entry, or of the hovered
//! entry when nothing is selected (an empty line for an empty directory).
//!
//! The plugin answers by writing one instruction per line into the command
//! file (`M-CMD-*`):
//!
//! | line             | effect                                   |
//! |------------------|------------------------------------------|
//! | `cd <path>`      | change directory, relative to the current |
//! | `select <name>`  | put the cursor on `<name>`               |
//! | `error <text>`   | queue an error message                   |
//! | `refresh`        | re-read the directory                    |
//! | `deselect all`   | clear the selection                      |
//!
//! Anything else is ignored. Both files are removed once the answer has been
//! applied.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tracing::{debug, info};

use crate::controller::actions::PluginCall;
use crate::error::{AppError, AppResult};
use crate::model::fs_state::Tab;
use crate::model::selection::SelectionSet;
use crate::tasks::process_task::{ProcessRequest, StdioMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginInstruction {
    Cd(String),
    Select(String),
    Error(String),
    Refresh,
    DeselectAll,
}

impl PluginInstruction {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches('\r');

        if let Some(path) = line.strip_prefix("cd ") {
            return Some(Self::Cd(path.to_string()));
        }
        if let Some(name) = line.strip_prefix("select ") {
            return Some(Self::Select(name.to_string()));
        }
        if let Some(message) = line.strip_prefix("error ") {
            return Some(Self::Error(message.to_string()));
        }

        match line.trim() {
            "refresh" => Some(Self::Refresh),
            "deselect all" => Some(Self::DeselectAll),
            _ => None,
        }
    }
}

/// Parse a command file body, keeping file order.
pub fn parse_instructions(text: &str) -> Vec<PluginInstruction> {
    text.lines()
        .filter_map(|line| {
            let parsed = PluginInstruction::parse(line);
            if parsed.is_none() && !line.trim().is_empty() {
                debug!("Ignoring plugin line {:?}", line);
            }
            parsed
        })
        .collect()
}

/// A running plugin and the files it talks through. Dropping it removes
/// both files.
#[derive(Debug)]
pub struct PluginInvocation {
    pub plugin_path: PathBuf,
    pub state_file: TempPath,
    pub command_file: TempPath,
}

impl PluginInvocation {
    pub fn read_instructions(&self) -> AppResult<Vec<PluginInstruction>> {
        let text = std::fs::read_to_string(&self.command_file).map_err(|e| {
            AppError::Plugin(format!(
                "Error reading cmd file {}: {}",
                self.command_file.display(),
                e
            ))
        })?;
        Ok(parse_instructions(&text))
    }
}

/// State file body for the current tab and selection.
pub fn state_contents(tab: &Tab, selection: &SelectionSet) -> String {
    let mut doc = String::new();
    doc.push_str(&tab.absolute_directory.to_string_lossy());
    doc.push('\n');

    if selection.is_empty() {
        if let Some(path) = tab.hovered_path() {
            doc.push_str(&path.to_string_lossy());
        }
        doc.push('\n');
    } else {
        for path in selection.paths() {
            doc.push_str(&path.to_string_lossy());
            doc.push('\n');
        }
    }

    doc
}

fn create_temp(tmp_dir: &Path, prefix: &str, contents: &str) -> AppResult<TempPath> {
    let mut file = Builder::new()
        .prefix(prefix)
        .tempfile_in(tmp_dir)
        .map_err(|e| AppError::Plugin(format!("Error creating {prefix} file: {e}")))?;
    file.write_all(contents.as_bytes())?;

    let path = file.into_temp_path();
    info!("Created TMP File: {}", path.display());
    Ok(path)
}

/// Write the state and command files and build the request that starts the
/// plugin.
pub fn prepare(
    plugins_dir: &Path,
    call: &PluginCall,
    tab: &Tab,
    selection: &SelectionSet,
    tmp_dir: &Path,
) -> AppResult<(PluginInvocation, ProcessRequest)> {
    let plugin_path = plugins_dir.join(call.name.as_str());

    let state_file = create_temp(tmp_dir, "M-STATE-", &state_contents(tab, selection))?;
    let command_file = create_temp(tmp_dir, "M-CMD-", "")?;

    let mut args = vec![
        command_file.to_string_lossy().into_owned(),
        state_file.to_string_lossy().into_owned(),
    ];
    args.extend(call.args.iter().cloned());

    let stdio = if call.interactive {
        StdioMode::TerminalCaptureStderr
    } else {
        StdioMode::Captured
    };

    let request = ProcessRequest::new(plugin_path.to_string_lossy(), args, stdio)
        .in_dir(&tab.absolute_directory);

    debug!("Plugin request {}", request.full_command());

    Ok((
        PluginInvocation {
            plugin_path,
            state_file,
            command_file,
        },
        request,
    ))
}
