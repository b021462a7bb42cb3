// bfm-core/src/model/app_state.rs
// Aggregate of the browsing model: tabs, selection and UI state

use std::path::PathBuf;

use crate::model::fs_state::{FSState, Tab};
use crate::model::selection::SelectionSet;
use crate::model::ui_state::UIState;

#[derive(Debug, Default)]
pub struct AppState {
    pub fs: FSState,
    pub selection: SelectionSet,
    pub ui: UIState,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tab(&self) -> &Tab {
        self.fs.current_tab()
    }

    #[inline]
    pub fn tab_mut(&mut self) -> &mut Tab {
        self.fs.current_tab_mut()
    }

    /// Selected paths, or the hovered entry when nothing is selected.
    pub fn targets(&self) -> Vec<PathBuf> {
        if self.selection.is_empty() {
            self.tab().hovered_path().into_iter().collect()
        } else {
            self.selection.paths()
        }
    }

    /// Whether filtered entry `index` of the current tab is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        let tab = self.tab();
        tab.filtered_entries
            .get(index)
            .is_some_and(|e| self.selection.contains(&tab.absolute_directory, &e.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::object_info::ObjectInfo;
    use std::path::Path;
    use std::time::SystemTime;

    fn state() -> AppState {
        let mut state = AppState::new();
        state.fs.select_tab(0);
        let tab = state.tab_mut();
        tab.absolute_directory = PathBuf::from("/a");
        tab.directory = PathBuf::from("/a");
        tab.entries = vec![
            ObjectInfo::file("x", 0, SystemTime::UNIX_EPOCH),
            ObjectInfo::file("y", 0, SystemTime::UNIX_EPOCH),
        ];
        tab.rerun_filter();
        state
    }

    #[test]
    fn test_targets_fall_back_to_hovered() {
        let mut state = state();
        assert_eq!(state.targets(), vec![PathBuf::from("/a/x")]);

        state.selection.select(Path::new("/b"), "z");
        state.selection.select(Path::new("/a"), "y");
        assert_eq!(
            state.targets(),
            vec![PathBuf::from("/a/y"), PathBuf::from("/b/z")]
        );
        assert!(state.is_selected(1));
        assert!(!state.is_selected(0));
    }

    #[test]
    fn test_targets_empty_directory() {
        let mut state = state();
        state.tab_mut().entries.clear();
        state.tab_mut().rerun_filter();
        assert!(state.targets().is_empty());
    }
}
