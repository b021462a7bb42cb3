// bfm-core/src/controller/action_dispatcher/fs_dispatcher.rs
// File operations: external move/copy/trash/remove/open and editor-buffer edits

use std::path::PathBuf;

use tracing::{debug, info};

use crate::controller::actions::Action;
use crate::controller::event_loop::{Effect, RunPurpose};
use crate::error::{AppError, AppResult};
use crate::model::selection::SelectedEntry;
use crate::tasks::edit_task::EditSession;
use crate::tasks::process_task::{ProcessRequest, RunOutcome};

use super::{ActionMatcher, DispatchContext, DispatchResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct FsDispatcher;

struct Transfer {
    program: &'static str,
    verb: &'static str,
    failure_message: &'static str,
}

const MOVE: Transfer = Transfer {
    program: "mv",
    verb: "move",
    failure_message: "Error moving file(s)",
};

const COPY: Transfer = Transfer {
    program: "cp",
    verb: "copy",
    failure_message: "Error copying file(s)",
};

impl FsDispatcher {
    /// Move or copy the selection (or the hovered entry) into the current
    /// directory.
    fn transfer(ctx: &mut DispatchContext<'_>, op: &Transfer) -> DispatchResult {
        let dst = ctx.current_dir();

        let sources: Vec<SelectedEntry> = if ctx.state.selection.is_empty() {
            ctx.state
                .tab()
                .hovered_name()
                .map(|name| SelectedEntry {
                    directory: dst.clone(),
                    name,
                })
                .into_iter()
                .collect()
        } else {
            ctx.state.selection.sorted()
        };

        if sources.is_empty() {
            ctx.push_error(format!("No files selected to {}", op.verb));
            return DispatchResult::done();
        }

        let already_here: Vec<String> = sources
            .iter()
            .filter(|s| s.directory == dst)
            .map(|s| format!("{} is already in {}", s.name, dst.display()))
            .collect();
        if !already_here.is_empty() {
            ctx.push_error(already_here.join("\n"));
            return DispatchResult::done();
        }

        let mut args: Vec<String> = sources
            .iter()
            .map(|s| s.path().to_string_lossy().into_owned())
            .collect();
        args.push(dst.to_string_lossy().into_owned());

        debug!("{} {} entries into {}", op.verb, sources.len(), dst.display());
        DispatchResult::effect(Effect::run(
            ProcessRequest::captured(op.program, args).in_dir(dst),
            RunPurpose::FileOperation {
                failure_message: op.failure_message,
            },
        ))
    }

    /// Run `program` on every target. Nothing happens in an empty directory.
    fn on_targets(
        ctx: &mut DispatchContext<'_>,
        program: &str,
        leading: &[&str],
        failure_message: &'static str,
    ) -> DispatchResult {
        let targets: Vec<PathBuf> = ctx.state.targets();
        if targets.is_empty() {
            return DispatchResult::done();
        }

        let args = leading
            .iter()
            .map(|a| (*a).to_string())
            .chain(targets.iter().map(|p| p.to_string_lossy().into_owned()));

        DispatchResult::effect(Effect::run(
            ProcessRequest::captured(program, args).in_dir(ctx.current_dir()),
            RunPurpose::FileOperation { failure_message },
        ))
    }

    fn start_edit(
        ctx: &mut DispatchContext<'_>,
        session: AppResult<Option<EditSession>>,
    ) -> DispatchResult {
        match session {
            Ok(Some(session)) => {
                info!("Editing {} buffer {}", session.kind, session.buffer.display());
                let request = session.editor_request(&ctx.config.editor_command());
                DispatchResult::effect(Effect::run(request, RunPurpose::Edit(session)))
            }
            Ok(None) => DispatchResult::done(),
            Err(AppError::InvalidInput { message, .. }) => {
                ctx.push_error(message);
                DispatchResult::done()
            }
            Err(e) => {
                ctx.push_error(e.to_string());
                DispatchResult::done()
            }
        }
    }
}

/// Apply an edited buffer once its editor exits. A failing editor cancels
/// the edit.
pub fn finish_edit(
    ctx: &mut DispatchContext<'_>,
    session: EditSession,
    outcome: &RunOutcome,
) -> Vec<Effect> {
    if outcome.is_success() {
        for message in session.apply() {
            ctx.push_error(message);
        }
    } else {
        info!("Cancelled {}: {}", session.kind, outcome.failure_reason());
        drop(session);
    }

    ctx.refresh();
    Vec::new()
}

impl ActionMatcher for FsDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::Move
                | Action::Copy
                | Action::Trash
                | Action::Remove
                | Action::Open
                | Action::Mkdirs
                | Action::Duplicate
                | Action::Rename
                | Action::BulkRename
        )
    }

    fn handle(&self, ctx: &mut DispatchContext<'_>, action: &Action) -> DispatchResult {
        match action {
            Action::Move => Self::transfer(ctx, &MOVE),
            Action::Copy => Self::transfer(ctx, &COPY),
            Action::Trash => Self::on_targets(ctx, "trash", &[], "Error trashing file"),
            Action::Remove => Self::on_targets(ctx, "rm", &["-rf", "--"], "Error removing file"),
            Action::Open => Self::on_targets(ctx, "open", &["--"], "Error opening file"),
            Action::Rename => {
                let session = EditSession::rename(ctx.state.tab(), ctx.tmp_dir);
                Self::start_edit(ctx, session)
            }
            Action::Duplicate => {
                let session = EditSession::duplicate(ctx.state.tab(), ctx.fs, ctx.tmp_dir);
                Self::start_edit(ctx, session)
            }
            Action::Mkdirs => {
                let session = EditSession::mkdirs(ctx.state.tab(), ctx.tmp_dir).map(Some);
                Self::start_edit(ctx, session)
            }
            Action::BulkRename => {
                let session = EditSession::bulk_rename(ctx.state.tab(), ctx.tmp_dir).map(Some);
                Self::start_edit(ctx, session)
            }
            _ => DispatchResult::NotHandled,
        }
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}
