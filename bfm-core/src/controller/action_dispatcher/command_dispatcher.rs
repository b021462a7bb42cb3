//! action_dispatcher/command_dispatcher.rs
//! Quit, help, editor and shell launches, and plugin runs

use std::path::Path;

use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::controller::actions::{Action, PluginCall};
use crate::controller::event_loop::{Effect, RunPurpose};
use crate::error::{AppError, AppResult};
use crate::model::ui_state::RedrawFlag;
use crate::tasks::plugin_task::{self, PluginInstruction, PluginInvocation};
use crate::tasks::process_task::{ProcessRequest, RunOutcome, StdioMode};
use crate::tasks::report_task::{pager_request, plugin_report};

use super::{ActionMatcher, DispatchContext, DispatchResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Close the current tab. Leaving the last one records the directory for
    /// the shell wrapper and quits.
    fn quit(ctx: &mut DispatchContext<'_>) -> DispatchResult {
        let directory = ctx.state.tab().directory.clone();

        if let Some(index) = ctx.state.fs.close_current_tab() {
            debug!("Closed tab, back to tab {}", index + 1);
            ctx.state.fs.select_tab(index);
            ctx.refresh();
            return DispatchResult::done();
        }

        if let Err(e) = write_lastd(&ctx.paths.lastd_file, &directory) {
            warn!("Cannot record last directory: {}", e);
        }
        info!("Last tab closed, quitting in {}", directory.display());
        DispatchResult::effect(Effect::Quit)
    }

    fn tracked(request: ProcessRequest) -> DispatchResult {
        DispatchResult::effect(Effect::run(
            request,
            RunPurpose::Tracked {
                error_expected: false,
            },
        ))
    }

    fn edit_hovered(ctx: &mut DispatchContext<'_>) -> DispatchResult {
        let Some(name) = ctx.state.tab().hovered_name() else {
            return DispatchResult::done();
        };
        let editor = ctx.config.editor_command();

        let request = if ctx.in_tmux {
            ProcessRequest::terminal(
                "tmux",
                [
                    "new-window".to_string(),
                    "-n".to_string(),
                    editor.clone(),
                    format!("{editor} \"{name}\""),
                ],
            )
        } else {
            let mut words = editor.split_whitespace().map(str::to_string);
            let program = words.next().unwrap_or_else(|| "vim".to_string());
            ProcessRequest::terminal(program, words.chain(std::iter::once(name.to_string())))
        };

        Self::tracked(request.in_dir(ctx.current_dir()))
    }

    fn shell(ctx: &mut DispatchContext<'_>) -> DispatchResult {
        if ctx.in_tmux {
            let request = ProcessRequest::terminal("tmux", ["new-window", "-n", "BASH", "bash"])
                .in_dir(ctx.current_dir());
            return Self::tracked(request);
        }

        let call = PluginCall {
            name: CompactString::from("shell"),
            args: SmallVec::new(),
            interactive: true,
        };
        Self::plugin(ctx, &call)
    }

    fn plugin(ctx: &mut DispatchContext<'_>, call: &PluginCall) -> DispatchResult {
        let prepared = plugin_task::prepare(
            &ctx.paths.plugins_dir,
            call,
            ctx.state.tab(),
            &ctx.state.selection,
            ctx.tmp_dir,
        );

        match prepared {
            Ok((invocation, request)) => {
                info!("Running plugin {}", invocation.plugin_path.display());
                DispatchResult::effect(Effect::run(request, RunPurpose::Plugin(invocation)))
            }
            Err(e) => {
                ctx.push_error(e.to_string());
                DispatchResult::done()
            }
        }
    }
}

fn write_lastd(path: &Path, directory: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::file_operation_failed("create", parent, e.to_string()))?;
    }
    std::fs::write(path, directory.to_string_lossy().as_bytes())
        .map_err(|e| AppError::file_operation_failed("write", path, e.to_string()))
}

fn apply_instruction(ctx: &mut DispatchContext<'_>, instruction: PluginInstruction) {
    debug!("Plugin instruction {:?}", instruction);
    match instruction {
        PluginInstruction::Cd(path) => ctx.change_directory(Path::new(&path)),
        PluginInstruction::Select(name) => {
            if !ctx.state.tab_mut().jump_to(&name) {
                debug!("{} not in listing", name);
            }
            ctx.state.ui.request_redraw(RedrawFlag::Main);
        }
        PluginInstruction::Error(message) => ctx.push_error(message),
        PluginInstruction::Refresh => ctx.refresh(),
        PluginInstruction::DeselectAll => {
            ctx.state.selection.clear();
            ctx.state.ui.request_redraw(RedrawFlag::All);
        }
    }
}

/// Apply a finished plugin's command file. A plugin that did not exit is
/// reported in the pager instead. Both protocol files are removed.
pub fn finish_plugin(
    ctx: &mut DispatchContext<'_>,
    invocation: PluginInvocation,
    outcome: &RunOutcome,
) -> Vec<Effect> {
    if !outcome.exited() {
        warn!(
            "Plugin {} did not exit: {}",
            invocation.plugin_path.display(),
            outcome.failure_reason()
        );
        let report = plugin_report(&invocation.plugin_path, outcome);
        drop(invocation);
        return ctx.pager_effect(&report).into_iter().collect();
    }

    if !outcome.is_success() {
        debug!("Plugin exited with {}", outcome.failure_reason());
    }

    match invocation.read_instructions() {
        Ok(instructions) => {
            for instruction in instructions {
                apply_instruction(ctx, instruction);
            }
        }
        Err(e) => ctx.push_error(e.to_string()),
    }

    drop(invocation);
    ctx.state.ui.request_redraw(RedrawFlag::All);
    Vec::new()
}

impl ActionMatcher for CommandDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::Quit
                | Action::Help
                | Action::Edit
                | Action::Editor
                | Action::Files
                | Action::CatToNull
                | Action::Shell
                | Action::Plugin(_)
        )
    }

    fn handle(&self, ctx: &mut DispatchContext<'_>, action: &Action) -> DispatchResult {
        match action {
            Action::Quit => Self::quit(ctx),

            Action::Help => {
                let request = pager_request(
                    &ctx.config.pager_command(),
                    &ctx.paths.help_file,
                    ctx.current_dir(),
                );
                DispatchResult::effect(Effect::run(
                    request,
                    RunPurpose::Tracked {
                        error_expected: true,
                    },
                ))
            }

            Action::Edit => Self::edit_hovered(ctx),

            Action::Editor => {
                let editor = ctx.config.editor_command();
                let mut words = editor.split_whitespace();
                let program = words.next().unwrap_or("vim");
                Self::tracked(
                    ProcessRequest::new(program, words, StdioMode::Terminal)
                        .in_dir(ctx.current_dir()),
                )
            }

            Action::Files => {
                let dir = ctx.current_dir();
                Self::tracked(ProcessRequest::terminal(
                    "open",
                    [dir.to_string_lossy().into_owned()],
                ))
            }

            Action::CatToNull => {
                let Some(name) = ctx.state.tab().hovered_name() else {
                    return DispatchResult::done();
                };
                Self::tracked(
                    ProcessRequest::terminal(
                        "bash",
                        ["-c".to_string(), format!("cat '{name}' > /dev/null")],
                    )
                    .in_dir(ctx.current_dir()),
                )
            }

            Action::Shell => Self::shell(ctx),

            Action::Plugin(call) => Self::plugin(ctx, call),

            _ => DispatchResult::NotHandled,
        }
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
