// bfm-core/src/controller/action_dispatcher/navigation_dispatcher.rs
// Cursor, directory, tab, sort, filter and selection actions

use tracing::debug;

use crate::controller::actions::Action;
use crate::fs::utils::parent_dir;
use crate::model::ui_state::{RedrawFlag, UIMode};

use super::{ActionMatcher, DispatchContext, DispatchResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationDispatcher;

impl NavigationDispatcher {
    fn handle_cursor(ctx: &mut DispatchContext<'_>, action: &Action) {
        let half = ctx.state.ui.half_page() as isize;

        match action {
            Action::Down => ctx.state.tab_mut().move_cursor(1),
            Action::Up => ctx.state.tab_mut().move_cursor(-1),
            Action::DownHalf => ctx.state.tab_mut().move_cursor(half),
            Action::UpHalf => ctx.state.tab_mut().move_cursor(-half),
            Action::Top => ctx.state.tab_mut().cursor_top(),
            Action::Bottom => ctx.state.tab_mut().cursor_bottom(),
            Action::NextSelected | Action::PrevSelected => {
                let cursor = ctx.state.tab().cursor;
                let indices = ctx.state.selection.indices_in(ctx.state.tab());
                let target = if matches!(action, Action::NextSelected) {
                    indices.into_iter().find(|&i| i > cursor)
                } else {
                    indices.into_iter().rev().find(|&i| i < cursor)
                };
                if let Some(i) = target {
                    ctx.state.tab_mut().cursor = i;
                }
            }
            _ => return,
        }

        ctx.state.ui.request_redraw(RedrawFlag::Main);
    }

    fn handle_directory(ctx: &mut DispatchContext<'_>, action: &Action) {
        match action {
            Action::UpDirectory => {
                let parent = parent_dir(&ctx.current_dir());
                ctx.change_directory(&parent);
            }
            Action::EnterDirectory => {
                let tab = ctx.state.tab();
                if !tab.is_hovered_dir(ctx.fs) {
                    return;
                }
                if let Some(path) = tab.hovered_path() {
                    ctx.change_directory(&path);
                }
            }
            Action::Home => {
                let home = ctx.paths.home.clone();
                ctx.change_directory(&home);
            }
            Action::HistoryBack => ctx.go_history(true),
            Action::HistoryForward => ctx.go_history(false),
            Action::Refresh => {
                ctx.state.tab_mut().set_filter("");
                ctx.refresh();
            }
            _ => {}
        }
    }

    fn handle_tab(ctx: &mut DispatchContext<'_>, index: usize) {
        let previous = ctx.current_dir();
        let was_active = ctx.state.fs.select_tab(index);
        debug!("Tab {} selected, was active: {}", index + 1, was_active);

        if was_active {
            ctx.refresh();
        } else {
            ctx.change_directory(&previous);
        }
    }

    fn handle_selection(ctx: &mut DispatchContext<'_>, action: &Action) {
        match action {
            Action::Select => {
                let tab = ctx.state.tab();
                let Some(name) = tab.hovered_name() else {
                    return;
                };
                let dir = tab.absolute_directory.clone();
                ctx.state.selection.toggle(&dir, &name);
                ctx.state.tab_mut().move_cursor(1);
            }
            Action::SelectAll => ctx.state.selection.select_all(ctx.state.fs.current_tab()),
            Action::DeselectAll => ctx.state.selection.clear(),
            _ => return,
        }

        ctx.refresh();
    }
}

impl ActionMatcher for NavigationDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::Down
                | Action::Up
                | Action::Top
                | Action::Bottom
                | Action::DownHalf
                | Action::UpHalf
                | Action::NextSelected
                | Action::PrevSelected
                | Action::UpDirectory
                | Action::EnterDirectory
                | Action::Home
                | Action::HistoryBack
                | Action::HistoryForward
                | Action::Refresh
                | Action::Tab(_)
                | Action::Sort(_)
                | Action::Filter
                | Action::SelectedFiles
                | Action::Select
                | Action::SelectAll
                | Action::DeselectAll
        )
    }

    fn handle(&self, ctx: &mut DispatchContext<'_>, action: &Action) -> DispatchResult {
        match action {
            Action::Down
            | Action::Up
            | Action::Top
            | Action::Bottom
            | Action::DownHalf
            | Action::UpHalf
            | Action::NextSelected
            | Action::PrevSelected => Self::handle_cursor(ctx, action),

            Action::UpDirectory
            | Action::EnterDirectory
            | Action::Home
            | Action::HistoryBack
            | Action::HistoryForward
            | Action::Refresh => Self::handle_directory(ctx, action),

            Action::Tab(index) => Self::handle_tab(ctx, *index),

            Action::Sort(sort) => {
                ctx.state.tab_mut().set_sort(*sort);
                ctx.state.ui.request_redraw(RedrawFlag::All);
            }

            Action::Filter => ctx.state.ui.set_mode(UIMode::Filter),

            Action::SelectedFiles => {
                ctx.state.ui.selected_view_offset = 0;
                ctx.state.ui.set_mode(UIMode::Selected);
            }

            Action::Select | Action::SelectAll | Action::DeselectAll => {
                Self::handle_selection(ctx, action);
            }

            _ => return DispatchResult::NotHandled,
        }

        DispatchResult::done()
    }

    fn name(&self) -> &'static str {
        "navigation"
    }
}

#[cfg(test)]
mod tests {
    use super::super::Dispatcher;
    use crate::config::{AppPaths, Config};
    use crate::fs::dir_scanner::testing::MemoryFileSystem;
    use crate::fs::object_info::ObjectInfo;
    use crate::model::entry_filter::EntrySort;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn dispatcher(temp_dir: &TempDir) -> Dispatcher {
        let t = |secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        let fs = MemoryFileSystem::new().with_dir(
            "/work",
            vec![
                ObjectInfo::file("a", 30, t(1)),
                ObjectInfo::file("b", 10, t(3)),
                ObjectInfo::file("c", 20, t(2)),
                ObjectInfo::file("d", 40, t(4)),
            ],
        );
        Dispatcher::new(
            Arc::new(Config::default()),
            AppPaths::rooted_at(temp_dir.path()),
            Arc::new(fs),
            Path::new("/work"),
        )
        .with_temp_dir(temp_dir.path())
    }

    fn names(d: &Dispatcher) -> Vec<String> {
        d.state
            .tab()
            .filtered_entries
            .iter()
            .map(|e| e.name.to_string())
            .collect()
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(&temp_dir);

        d.handle_command("up");
        assert_eq!(d.state.tab().cursor, 0);
        d.handle_command("down_half");
        d.handle_command("down_half");
        assert_eq!(d.state.tab().cursor, 3);
        d.handle_command("down");
        assert_eq!(d.state.tab().cursor, 3);
        d.handle_command("top");
        assert_eq!(d.state.tab().cursor, 0);
    }

    #[test]
    fn test_sort_commands_reorder() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(&temp_dir);

        d.handle_command("sort_modified");
        assert_eq!(names(&d), ["d", "b", "c", "a"]);
        assert_eq!(d.state.tab().sort, EntrySort::ByModifiedDesc);

        d.handle_command("sort_size");
        assert_eq!(names(&d), ["b", "c", "a", "d"]);

        d.handle_command("sort_name");
        assert_eq!(names(&d), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_select_moves_down_and_jumps_between_selected() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(&temp_dir);

        d.handle_command("select");
        assert_eq!(d.state.tab().cursor, 1);
        d.handle_command("bottom");
        d.handle_command("select");
        assert_eq!(d.state.selection.len(), 2);
        assert_eq!(d.state.tab().cursor, 3);

        d.handle_command("prev_selected");
        assert_eq!(d.state.tab().cursor, 0);
        d.handle_command("prev_selected");
        assert_eq!(d.state.tab().cursor, 0);
        d.handle_command("next_selected");
        assert_eq!(d.state.tab().cursor, 3);

        d.handle_command("deselect_all");
        assert!(d.state.selection.is_empty());
    }

    #[test]
    fn test_home_falls_back_when_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let mut d = dispatcher(&temp_dir);

        d.handle_command("home");
        assert!(d.state.ui.has_errors());
        assert!(
            d.state
                .ui
                .current_error()
                .unwrap()
                .starts_with("Error getting contents of")
        );
    }
}
