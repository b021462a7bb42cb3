//! ``src/controller/action_dispatcher.rs``
//! ============================================================================
//! # Dispatcher: keys, modes and task completions
//!
//! Owns the browsing state and turns each key into state changes plus a list
//! of [`Effect`]s for the event loop. Keys are interpreted per [`UIMode`]:
//!
//! Pending errors swallow the key in every mode (one dismissal per key).
//!
//! * `Command`: the key is resolved through [`KeyBindings`] and the command
//!   string parsed into an [`Action`] routed to the first [`ActionMatcher`]
//!   that claims it.
//! * `Filter`: keys edit the filter text directly.
//! * `Selected`: keys scroll the selection list.
//!
//! Completions come back as [`TaskResult`]s and are finished according to the
//! [`RunPurpose`] attached when the run was requested.

pub mod command_dispatcher;
pub mod fs_dispatcher;
pub mod navigation_dispatcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};

use crate::config::{AppPaths, Config};
use crate::controller::actions::Action;
use crate::controller::event_loop::{Effect, RunPurpose, TaskResult};
use crate::controller::key_bindings::{KeyBindings, NO_COMMAND};
use crate::fs::dir_scanner::FileSystem;
use crate::fs::utils::{normalize_path, parent_dir, temp_dir};
use crate::model::app_state::AppState;
use crate::model::ui_state::{RedrawFlag, UIMode};
use crate::tasks::report_task::{command_report, pager_request, run_error_message, write_report};

use self::command_dispatcher::CommandDispatcher;
use self::fs_dispatcher::FsDispatcher;
use self::navigation_dispatcher::NavigationDispatcher;

/// Outcome of offering an action to a sub-dispatcher.
#[derive(Debug)]
pub enum DispatchResult {
    /// Handled; run these effects.
    Continue(Vec<Effect>),

    NotHandled,
}

impl DispatchResult {
    pub const fn done() -> Self {
        Self::Continue(Vec::new())
    }

    pub fn effect(effect: Effect) -> Self {
        Self::Continue(vec![effect])
    }
}

/// A group of related actions.
pub trait ActionMatcher: Sync {
    fn can_handle(&self, action: &Action) -> bool;

    fn handle(&self, ctx: &mut DispatchContext<'_>, action: &Action) -> DispatchResult;

    fn name(&self) -> &'static str;
}

const HANDLERS: [&dyn ActionMatcher; 3] =
    [&NavigationDispatcher, &FsDispatcher, &CommandDispatcher];

/// Everything a sub-dispatcher may touch while handling one action.
pub struct DispatchContext<'a> {
    pub state: &'a mut AppState,
    pub fs: &'a dyn FileSystem,
    pub config: &'a Config,
    pub paths: &'a AppPaths,
    pub tmp_dir: &'a Path,
    pub in_tmux: bool,
}

impl DispatchContext<'_> {
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.ui.push_error(message);
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    pub fn current_dir(&self) -> PathBuf {
        self.state.tab().absolute_directory.clone()
    }

    /// Change the current tab to `path` (relative to the current directory)
    /// and record it in history. A directory that cannot be read sends the
    /// tab to the nearest readable parent, with an error per attempt.
    pub fn change_directory(&mut self, path: &Path) {
        let mut target = normalize_path(&self.state.tab().absolute_directory, path);

        loop {
            match self.state.tab_mut().change_directory(self.fs, &target) {
                Ok(()) => {
                    let tab = self.state.tab_mut();
                    let dir = tab.absolute_directory.clone();
                    tab.add_history(dir);
                    break;
                }
                Err(e) => {
                    warn!("Cannot list {}: {}", target.display(), e);
                    let parent = parent_dir(&target);
                    if parent == target {
                        self.push_error(format!("Error getting contents of {}.", target.display()));
                        break;
                    }
                    self.push_error(unavailable_message(&target, &parent));
                    target = parent;
                }
            }
        }

        self.state.ui.request_redraw(RedrawFlag::All);
    }

    /// Re-read the current directory. In the selection view this only
    /// redraws.
    pub fn refresh(&mut self) {
        self.state.ui.request_redraw(RedrawFlag::All);
        if self.state.ui.mode == UIMode::Selected {
            return;
        }

        if let Err(e) = self.state.tab_mut().refresh(self.fs) {
            let dir = self.current_dir();
            warn!("Refresh of {} failed: {}", dir.display(), e);
            let parent = parent_dir(&dir);
            self.push_error(unavailable_message(&dir, &parent));
            self.change_directory(&parent);
        }
    }

    /// Load a history entry without recording it again.
    pub fn go_history(&mut self, back: bool) {
        let tab = self.state.tab_mut();
        let step = if back {
            tab.history_step_back()
        } else {
            tab.history_step_forward()
        };
        let Some(dir) = step else {
            trace!("History at its end");
            return;
        };

        match self.state.tab_mut().change_directory(self.fs, &dir) {
            Ok(()) => self.refresh(),
            Err(e) => {
                warn!("History entry {} unavailable: {}", dir.display(), e);
                let parent = parent_dir(&dir);
                self.push_error(unavailable_message(&dir, &parent));
                self.change_directory(&parent);
            }
        }
    }

    /// Write `body` to a report file and page it.
    pub fn pager_effect(&mut self, body: &str) -> Option<Effect> {
        match write_report(self.tmp_dir, body) {
            Ok(report) => {
                let request =
                    pager_request(&self.config.pager_command(), &report, self.current_dir());
                Some(Effect::run(request, RunPurpose::Report(report)))
            }
            Err(e) => {
                warn!("Cannot write error report: {}", e);
                self.push_error(body.to_string());
                None
            }
        }
    }
}

fn unavailable_message(dir: &Path, parent: &Path) -> String {
    format!(
        "Error getting contents of {}.  Folder may have been removed.  Changing directory to {}.",
        dir.display(),
        parent.display()
    )
}

pub struct Dispatcher {
    pub state: AppState,
    bindings: KeyBindings,
    config: Arc<Config>,
    paths: AppPaths,
    fs: Arc<dyn FileSystem>,
    tmp_dir: PathBuf,
    in_tmux: bool,
}

impl Dispatcher {
    /// Open tab 1 on `start_dir`.
    pub fn new(
        config: Arc<Config>,
        paths: AppPaths,
        fs: Arc<dyn FileSystem>,
        start_dir: &Path,
    ) -> Self {
        let mut dispatcher = Self {
            state: AppState::new(),
            bindings: KeyBindings::from_config(&config),
            config,
            paths,
            fs,
            tmp_dir: temp_dir(),
            in_tmux: std::env::var_os("TMUX").is_some(),
        };

        dispatcher.state.fs.select_tab(0);
        dispatcher.context().change_directory(start_dir);
        info!("Dispatcher ready in {}", start_dir.display());
        dispatcher
    }

    /// Directory for `M-*` temp files.
    #[must_use]
    pub fn with_temp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    #[must_use]
    pub const fn with_tmux(mut self, in_tmux: bool) -> Self {
        self.in_tmux = in_tmux;
        self
    }

    pub const fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_viewport_height(&mut self, rows: u16) {
        self.state.ui.set_viewport_height(rows);
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn context(&mut self) -> DispatchContext<'_> {
        DispatchContext {
            state: &mut self.state,
            fs: self.fs.as_ref(),
            config: &self.config,
            paths: &self.paths,
            tmp_dir: &self.tmp_dir,
            in_tmux: self.in_tmux,
        }
    }

    /// Handle one key, named as by [`key_name`](crate::controller::key_bindings::key_name).
    #[instrument(level = "trace", skip(self))]
    pub fn handle_key(&mut self, key: &str) -> Vec<Effect> {
        if self.state.ui.has_errors() {
            self.state.ui.dismiss_error();
            self.state.ui.request_redraw(RedrawFlag::All);
            return Vec::new();
        }

        match self.state.ui.mode {
            UIMode::Filter => {
                self.filter_key(key);
                Vec::new()
            }
            UIMode::Selected => self.selected_key(key),
            UIMode::Command => {
                let command = self.bindings.resolve(key).to_string();
                if command == NO_COMMAND {
                    trace!("Unbound key {:?}", key);
                    return Vec::new();
                }
                debug!("Key {:?} -> {:?}", key, command);
                self.handle_command(&command)
            }
        }
    }

    /// Run a command string such as `"tab 2"` or `"plugin autojump"`.
    pub fn handle_command(&mut self, command: &str) -> Vec<Effect> {
        match Action::parse(command) {
            Some(action) => self.handle_action(&action),
            None => {
                debug!("Unknown command {:?}", command);
                Vec::new()
            }
        }
    }

    pub fn handle_action(&mut self, action: &Action) -> Vec<Effect> {
        let mut ctx = self.context();
        for handler in HANDLERS {
            if !handler.can_handle(action) {
                continue;
            }
            trace!("{} handles {:?}", handler.name(), action);
            if let DispatchResult::Continue(effects) = handler.handle(&mut ctx, action) {
                return effects;
            }
        }

        debug!("No handler for {:?}", action);
        Vec::new()
    }

    fn filter_key(&mut self, key: &str) {
        let tab = self.state.tab_mut();
        match key {
            "esc" => {
                tab.set_filter("");
                self.state.ui.set_mode(UIMode::Command);
            }
            "enter" => self.state.ui.set_mode(UIMode::Command),
            "backspace" => {
                let mut filter = tab.filter_text.clone();
                filter.pop();
                tab.set_filter(&filter);
            }
            "ctrl+l" => tab.set_filter(""),
            "ctrl+w" => {
                let filter = tab.filter_text.clone();
                let trimmed = filter.trim_end_matches(' ');
                let kept = trimmed.rfind(' ').map_or("", |i| &filter[..=i]);
                tab.set_filter(kept);
            }
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => {
                        let mut filter = tab.filter_text.clone();
                        filter.push(c);
                        tab.set_filter(&filter);
                    }
                    _ => trace!("Filter ignores {:?}", other),
                }
            }
        }
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn selected_key(&mut self, key: &str) -> Vec<Effect> {
        let total = self.state.selection.len();
        let half = self.state.ui.half_page() as isize;

        match key {
            "esc" | "q" => {
                self.state.ui.set_mode(UIMode::Command);
                self.context().refresh();
            }
            "d" => {
                self.state.selection.clear();
                self.state.ui.selected_view_offset = 0;
            }
            "j" | "down" => self.state.ui.scroll_selected_view(1, total),
            "k" | "up" => self.state.ui.scroll_selected_view(-1, total),
            "ctrl+d" => self.state.ui.scroll_selected_view(half, total),
            "ctrl+u" => self.state.ui.scroll_selected_view(-half, total),
            "g" => self.state.ui.selected_view_offset = 0,
            "G" => self.state.ui.selected_view_offset = total.saturating_sub(1),
            _ => {
                if let Some(n) = key.parse::<usize>().ok().filter(|n| (1..=6).contains(n)) {
                    self.state.ui.set_mode(UIMode::Command);
                    return self.handle_action(&Action::Tab(n - 1));
                }
                trace!("Selected view ignores {:?}", key);
            }
        }

        self.state.ui.request_redraw(RedrawFlag::All);
        Vec::new()
    }

    /// Finish a run according to its purpose.
    pub fn handle_task_result(&mut self, result: TaskResult) -> Vec<Effect> {
        let TaskResult::Finished { purpose, outcome } = result;
        let mut ctx = self.context();

        match purpose {
            RunPurpose::FileOperation { failure_message } => {
                if !outcome.is_success() {
                    ctx.push_error(run_error_message(failure_message, &outcome));
                }
                ctx.state.selection.clear();
                ctx.refresh();
                Vec::new()
            }
            RunPurpose::Tracked { error_expected } => {
                let mut effects = Vec::new();
                if !outcome.is_success() && !error_expected {
                    info!("{} failed: {}", outcome.full_command, outcome.failure_reason());
                    effects.extend(ctx.pager_effect(&command_report(&outcome)));
                }
                ctx.refresh();
                effects
            }
            RunPurpose::Plugin(invocation) => {
                command_dispatcher::finish_plugin(&mut ctx, invocation, &outcome)
            }
            RunPurpose::Edit(session) => fs_dispatcher::finish_edit(&mut ctx, session, &outcome),
            RunPurpose::Report(report) => {
                debug!("Closing report {}", report.display());
                drop(report);
                ctx.refresh();
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::dir_scanner::testing::MemoryFileSystem;
    use crate::fs::object_info::ObjectInfo;
    use crate::model::ui_state::UIMode;
    use crate::tasks::process_task::{RunOutcome, RunStatus};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn file(name: &str) -> ObjectInfo {
        ObjectInfo::file(name, 1, SystemTime::UNIX_EPOCH)
    }

    fn memory_fs() -> Arc<MemoryFileSystem> {
        Arc::new(
            MemoryFileSystem::new()
                .with_dir("/", vec![ObjectInfo::dir("work"), ObjectInfo::dir("tmp")])
                .with_dir(
                    "/work",
                    vec![file("alpha"), file("beta"), file("gamma"), ObjectInfo::dir("sub")],
                )
                .with_dir("/work/sub", vec![file("inner")])
                .with_dir("/tmp", vec![file("dropped")]),
        )
    }

    fn dispatcher(fs: Arc<MemoryFileSystem>, temp_dir: &TempDir) -> Dispatcher {
        Dispatcher::new(
            Arc::new(Config::default()),
            AppPaths::rooted_at(temp_dir.path()),
            fs,
            Path::new("/work"),
        )
        .with_temp_dir(temp_dir.path())
        .with_tmux(false)
    }

    fn outcome(status: RunStatus) -> RunOutcome {
        RunOutcome {
            full_command: "cmd".into(),
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn hovered(d: &Dispatcher) -> String {
        d.state.tab().hovered_name().unwrap().to_string()
    }

    #[test]
    fn test_starts_in_directory_with_history() {
        let temp_dir = TempDir::new().unwrap();
        let d = dispatcher(memory_fs(), &temp_dir);

        assert_eq!(d.state.tab().absolute_directory, Path::new("/work"));
        assert_eq!(d.state.tab().history, vec![PathBuf::from("/work")]);
        assert_eq!(hovered(&d), "alpha");
        assert_eq!(d.state.ui.mode, UIMode::Command);
    }

    #[test]
    fn test_pending_errors_swallow_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);
        d.state.ui.push_error("first");
        d.state.ui.push_error("second");

        d.handle_key("j");
        assert_eq!(d.state.ui.current_error(), Some("second"));
        assert_eq!(d.state.tab().cursor, 0);

        d.handle_key("j");
        assert!(!d.state.ui.has_errors());
        assert_eq!(d.state.tab().cursor, 0);

        d.handle_key("j");
        assert_eq!(d.state.tab().cursor, 1);
    }

    #[test]
    fn test_pending_errors_swallow_keys_in_filter_and_selected_modes() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);

        d.handle_key("/");
        d.state.ui.push_error("boom");
        d.handle_key("x");
        assert!(!d.state.ui.has_errors());
        assert_eq!(d.state.ui.mode, UIMode::Filter);
        assert_eq!(d.state.tab().filter_text, "");

        d.handle_key("esc");
        d.handle_command("select_all");
        d.handle_key("ctrl+s");
        d.state.ui.push_error("boom2");
        let effects = d.handle_key("q");
        assert!(effects.is_empty());
        assert!(!d.state.ui.has_errors());
        assert_eq!(d.state.ui.mode, UIMode::Selected);
        assert_eq!(d.state.selection.len(), 4);
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);

        assert!(d.handle_command("frobnicate now").is_empty());
        assert!(!d.state.ui.has_errors());
        assert_eq!(d.state.tab().cursor, 0);
    }

    #[test]
    fn test_filter_mode_editing() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);

        d.handle_key("/");
        assert_eq!(d.state.ui.mode, UIMode::Filter);

        for key in ["a", "l", "up"] {
            d.handle_key(key);
        }
        assert_eq!(d.state.tab().filter_text, "al");
        assert_eq!(d.state.tab().filtered_entries.len(), 1);

        d.handle_key("backspace");
        assert_eq!(d.state.tab().filter_text, "a");

        for key in [" ", "b", "e", " "] {
            d.handle_key(key);
        }
        d.handle_key("ctrl+w");
        assert_eq!(d.state.tab().filter_text, "a ");
        d.handle_key("ctrl+w");
        assert_eq!(d.state.tab().filter_text, "");

        d.handle_key("g");
        d.handle_key("enter");
        assert_eq!(d.state.ui.mode, UIMode::Command);
        assert_eq!(d.state.tab().filter_text, "g");

        d.handle_key("/");
        d.handle_key("esc");
        assert_eq!(d.state.ui.mode, UIMode::Command);
        assert_eq!(d.state.tab().filter_text, "");
        assert_eq!(d.state.tab().filtered_entries.len(), 4);
    }

    #[test]
    fn test_selected_view_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);
        d.handle_command("select_all");
        assert_eq!(d.state.selection.len(), 4);

        d.handle_key("ctrl+s");
        assert_eq!(d.state.ui.mode, UIMode::Selected);

        d.handle_key("j");
        d.handle_key("j");
        assert_eq!(d.state.ui.selected_view_offset, 2);
        d.handle_key("G");
        assert_eq!(d.state.ui.selected_view_offset, 3);
        d.handle_key("g");
        assert_eq!(d.state.ui.selected_view_offset, 0);

        d.handle_key("3");
        assert_eq!(d.state.ui.mode, UIMode::Command);
        assert_eq!(d.state.fs.current, 2);
        assert_eq!(d.state.tab().absolute_directory, Path::new("/work"));

        d.handle_key("ctrl+s");
        d.handle_key("d");
        assert!(d.state.selection.is_empty());
        d.handle_key("q");
        assert_eq!(d.state.ui.mode, UIMode::Command);
    }

    #[test]
    fn test_navigation_and_history() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);

        d.handle_command("bottom");
        assert_eq!(hovered(&d), "sub");
        d.handle_command("enter_directory");
        assert_eq!(d.state.tab().absolute_directory, Path::new("/work/sub"));

        d.handle_command("up_directory");
        d.handle_command("up_directory");
        assert_eq!(d.state.tab().absolute_directory, Path::new("/"));

        d.handle_command("history_back");
        assert_eq!(d.state.tab().absolute_directory, Path::new("/work"));
        d.handle_command("history_back");
        assert_eq!(d.state.tab().absolute_directory, Path::new("/work/sub"));
        d.handle_command("history_forward");
        d.handle_command("history_forward");
        assert_eq!(d.state.tab().absolute_directory, Path::new("/"));
        d.handle_command("history_forward");
        assert_eq!(d.state.tab().absolute_directory, Path::new("/"));
        assert_eq!(d.state.tab().history.len(), 4);
    }

    #[test]
    fn test_vanished_directory_falls_back_to_parent() {
        let temp_dir = TempDir::new().unwrap();
        let fs = memory_fs();
        let mut d = dispatcher(fs.clone(), &temp_dir);
        d.handle_command("bottom");
        d.handle_command("enter_directory");

        fs.remove_dir("/work/sub");
        d.handle_command("refresh");

        assert_eq!(d.state.tab().absolute_directory, Path::new("/work"));
        assert_eq!(
            d.state.ui.current_error(),
            Some(
                "Error getting contents of /work/sub.  Folder may have been removed.  \
                 Changing directory to /work."
            )
        );
    }

    #[test]
    fn test_new_tab_opens_on_previous_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);
        d.handle_command("bottom");
        d.handle_command("enter_directory");

        d.handle_key("2");
        assert_eq!(d.state.fs.current, 1);
        assert_eq!(d.state.tab().absolute_directory, Path::new("/work/sub"));

        d.handle_key("1");
        assert_eq!(d.state.fs.current, 0);
        assert_eq!(d.state.tab().absolute_directory, Path::new("/work/sub"));
    }

    #[test]
    fn test_quit_closes_tabs_then_exits() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);
        d.handle_key("4");
        d.handle_command("up_directory");

        let effects = d.handle_key("q");
        assert!(effects.is_empty());
        assert_eq!(d.state.fs.current, 0);
        assert!(!d.state.fs.tabs[3].active);

        let effects = d.handle_key("q");
        assert!(matches!(effects.as_slice(), [Effect::Quit]));
        let lastd = std::fs::read_to_string(temp_dir.path().join("bfm.lastd")).unwrap();
        assert_eq!(lastd, "/work");
    }

    #[test]
    fn test_file_operation_completion_reports_and_clears() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);
        d.handle_command("select");

        let effects = d.handle_task_result(TaskResult::Finished {
            purpose: RunPurpose::FileOperation {
                failure_message: "Error trashing file",
            },
            outcome: outcome(RunStatus::Exited(1)),
        });

        assert!(effects.is_empty());
        assert!(d.state.selection.is_empty());
        assert!(
            d.state
                .ui
                .current_error()
                .unwrap()
                .starts_with("Error trashing file with cmd:")
        );
    }

    #[test]
    fn test_tracked_failure_pages_a_report() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(memory_fs(), &temp_dir);

        let effects = d.handle_task_result(TaskResult::Finished {
            purpose: RunPurpose::Tracked {
                error_expected: false,
            },
            outcome: outcome(RunStatus::Exited(2)),
        });
        let [Effect::Run { request, purpose }] = effects.as_slice() else {
            panic!("expected a pager run");
        };
        assert_eq!(request.program, "bash");
        let RunPurpose::Report(report) = purpose else {
            panic!("expected a report purpose");
        };
        assert!(std::fs::read_to_string(report).unwrap().starts_with("Error running:"));

        let quiet = d.handle_task_result(TaskResult::Finished {
            purpose: RunPurpose::Tracked {
                error_expected: true,
            },
            outcome: outcome(RunStatus::Exited(2)),
        });
        assert!(quiet.is_empty());
    }
}
