//! ``src/model/fs_state.rs``
//! ============================================================================
//! # `FSState`: Tabs, listings and per-tab history
//!
//! Six fixed tab slots, each owning a directory listing, its filtered/sorted
//! view, a cursor into that view and a browser-style history stack.
//!
//! Cursor invariant: `cursor < filtered_entries.len()` whenever the view is
//! non-empty, `cursor == 0` otherwise. Every mutation that can shrink the
//! view clamps the cursor afterwards.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::error::AppResult;
use crate::fs::dir_scanner::FileSystem;
use crate::fs::object_info::ObjectInfo;
use crate::fs::utils::normalize_path;
use crate::model::entry_filter::{EntrySort, filter_and_sort};

pub const TAB_COUNT: usize = 6;

/// One tab slot.
#[derive(Debug, Clone, Default)]
pub struct Tab {
    pub active: bool,

    /// Directory as navigated to.
    pub directory: PathBuf,

    /// Absolute, lexically cleaned form of `directory`.
    pub absolute_directory: PathBuf,

    /// Raw listing from the filesystem collaborator.
    pub entries: Vec<ObjectInfo>,

    /// `entries` after filter and sort.
    pub filtered_entries: Vec<ObjectInfo>,

    pub cursor: usize,

    pub filter_text: String,

    pub sort: EntrySort,

    pub history: Vec<PathBuf>,

    /// Number of history entries up to and including the current directory.
    pub history_index: usize,
}

impl Tab {
    /// Load `path` into this tab. The tab is left untouched if the listing
    /// cannot be read.
    pub fn change_directory(&mut self, fs: &dyn FileSystem, path: &Path) -> AppResult<()> {
        debug!("ChangeDirectory {}", path.display());

        let absolute = normalize_path(&self.absolute_directory, path);
        let entries = fs.list_directory(&absolute)?;

        self.directory = absolute.clone();
        self.absolute_directory = absolute;
        self.entries = entries;
        self.cursor = 0;
        self.set_filter("");

        Ok(())
    }

    /// Re-read the current directory, keeping the filter and, where still
    /// valid, the cursor.
    pub fn refresh(&mut self, fs: &dyn FileSystem) -> AppResult<()> {
        self.entries = fs.list_directory(&self.absolute_directory)?;
        self.rerun_filter();
        trace!(
            "Refreshed {} cursor {}",
            self.absolute_directory.display(),
            self.cursor
        );
        Ok(())
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter_text = filter.to_string();
        self.filter_entries();
        self.cursor = 0;
    }

    pub fn rerun_filter(&mut self) {
        self.filter_entries();
        self.clamp_cursor();
    }

    /// Change sort mode. Like the filter reset on directory change, this
    /// starts from an empty filter at the top of the list.
    pub fn set_sort(&mut self, sort: EntrySort) {
        self.sort = sort;
        self.set_filter("");
    }

    fn filter_entries(&mut self) {
        self.filtered_entries = filter_and_sort(&self.entries, &self.filter_text, self.sort);
    }

    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.filtered_entries.len().saturating_sub(1));
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn add_history(&mut self, path: PathBuf) {
        self.history.truncate(self.history_index);
        self.history.push(path);
        self.history_index += 1;
        trace!("History push, index {}", self.history_index);
    }

    /// Step back. Returns the directory to load, or `None` at the start.
    pub fn history_step_back(&mut self) -> Option<PathBuf> {
        if self.history_index <= 1 {
            return None;
        }
        self.history_index -= 1;
        self.history.get(self.history_index - 1).cloned()
    }

    /// Step forward. Returns the directory to load, or `None` at the end.
    pub fn history_step_forward(&mut self) -> Option<PathBuf> {
        if self.history_index >= self.history.len() {
            return None;
        }
        self.history_index += 1;
        self.history.get(self.history_index - 1).cloned()
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    pub fn move_cursor(&mut self, lines_down: isize) {
        let max = self.filtered_entries.len().saturating_sub(1);
        let target = self.cursor.saturating_add_signed(lines_down);
        self.cursor = target.min(max);
    }

    pub fn cursor_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_bottom(&mut self) {
        self.cursor = self.filtered_entries.len().saturating_sub(1);
    }

    /// Put the cursor on the first filtered entry called `name`.
    pub fn jump_to(&mut self, name: &str) -> bool {
        debug!("Looking for {}", name);
        match self.filtered_entries.iter().position(|e| e.name == name) {
            Some(i) => {
                self.cursor = i;
                true
            }
            None => false,
        }
    }

    pub fn hovered(&self) -> Option<&ObjectInfo> {
        self.filtered_entries.get(self.cursor)
    }

    pub fn hovered_name(&self) -> Option<CompactString> {
        self.hovered().map(|e| e.name.clone())
    }

    pub fn hovered_path(&self) -> Option<PathBuf> {
        self.hovered()
            .map(|e| self.absolute_directory.join(e.name.as_str()))
    }

    /// Directory, or symlink resolving to a directory.
    pub fn is_hovered_dir(&self, fs: &dyn FileSystem) -> bool {
        self.hovered()
            .is_some_and(|e| e.is_dir || fs.is_dir_via_symlink(&self.absolute_directory, e))
    }

    /// Forget the listing when the slot is closed.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.filter_text.clear();
        self.entries.clear();
        self.filtered_entries.clear();
        self.cursor = 0;
    }
}

/// All tab slots plus the order in which they were visited.
#[derive(Debug, Clone)]
pub struct FSState {
    pub tabs: Vec<Tab>,

    pub current: usize,

    /// Every tab selection, oldest first; closing a tab walks it backwards.
    pub tab_history: Vec<usize>,
}

impl FSState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tabs: vec![Tab::default(); TAB_COUNT],
            current: 0,
            tab_history: Vec::new(),
        }
    }

    pub fn current_tab(&self) -> &Tab {
        &self.tabs[self.current]
    }

    pub fn current_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.current]
    }

    /// Make `index` current, activating it. Returns whether it was already
    /// active. Out-of-range indices are ignored and report `true`.
    pub fn select_tab(&mut self, index: usize) -> bool {
        let Some(tab) = self.tabs.get_mut(index) else {
            return true;
        };

        let was_active = tab.active;
        tab.active = true;
        self.current = index;
        self.tab_history.push(index);
        was_active
    }

    /// Close the current tab. Returns the most recently visited tab that is
    /// still active, or `None` when no tab remains open.
    pub fn close_current_tab(&mut self) -> Option<usize> {
        self.current_tab_mut().deactivate();

        while let Some(index) = self.tab_history.pop() {
            if self.tabs[index].active {
                return Some(index);
            }
        }

        None
    }

    pub fn active_tab_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.tabs
            .iter()
            .enumerate()
            .filter(|(_, t)| t.active)
            .map(|(i, _)| i + 1)
    }
}

impl Default for FSState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::dir_scanner::testing::MemoryFileSystem;
    use std::time::SystemTime;

    fn file(name: &str) -> ObjectInfo {
        ObjectInfo::file(name, 0, SystemTime::UNIX_EPOCH)
    }

    fn fs() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_dir("/a", vec![file("one"), file("two"), file("three")])
            .with_dir("/b", vec![file("x")])
            .with_dir("/c", vec![])
            .with_dir("/d", vec![file("d1")])
    }

    fn tab_at(fs: &MemoryFileSystem, path: &str) -> Tab {
        let mut tab = Tab {
            active: true,
            ..Tab::default()
        };
        tab.change_directory(fs, Path::new(path)).unwrap();
        tab.add_history(PathBuf::from(path));
        tab
    }

    fn navigate(tab: &mut Tab, fs: &MemoryFileSystem, path: &str) {
        tab.change_directory(fs, Path::new(path)).unwrap();
        tab.add_history(PathBuf::from(path));
    }

    fn back(tab: &mut Tab, fs: &MemoryFileSystem) {
        if let Some(dir) = tab.history_step_back() {
            tab.change_directory(fs, &dir).unwrap();
        }
    }

    fn forward(tab: &mut Tab, fs: &MemoryFileSystem) {
        if let Some(dir) = tab.history_step_forward() {
            tab.change_directory(fs, &dir).unwrap();
        }
    }

    #[test]
    fn test_cursor_bound_after_filter_and_cd() {
        let fs = fs();
        let mut tab = tab_at(&fs, "/a");
        tab.cursor_bottom();
        assert_eq!(tab.cursor, 2);

        tab.set_filter("tw");
        assert_eq!(tab.filtered_entries.len(), 1);
        assert_eq!(tab.cursor, 0);

        tab.set_filter("zzz");
        assert!(tab.filtered_entries.is_empty());
        assert_eq!(tab.cursor, 0);

        tab.change_directory(&fs, Path::new("/c")).unwrap();
        assert!(tab.filtered_entries.is_empty());
        assert_eq!(tab.cursor, 0);
        assert!(tab.filter_text.is_empty());
    }

    #[test]
    fn test_refresh_clamps_cursor_when_listing_shrinks() {
        let fs = fs();
        let mut tab = tab_at(&fs, "/a");
        tab.cursor_bottom();

        fs.set_dir("/a", vec![file("one")]);
        tab.refresh(&fs).unwrap();
        assert_eq!(tab.cursor, 0);
        assert_eq!(tab.filtered_entries.len(), 1);
    }

    #[test]
    fn test_failed_change_directory_leaves_tab_untouched() {
        let fs = fs();
        let mut tab = tab_at(&fs, "/a");
        tab.move_cursor(1);

        let err = tab.change_directory(&fs, Path::new("/missing")).unwrap_err();
        assert!(err.is_directory_unavailable());
        assert_eq!(tab.directory, PathBuf::from("/a"));
        assert_eq!(tab.cursor, 1);
    }

    #[test]
    fn test_history_round_trip_and_truncation() {
        let fs = fs();
        let mut tab = tab_at(&fs, "/a");
        navigate(&mut tab, &fs, "/b");
        navigate(&mut tab, &fs, "/c");

        back(&mut tab, &fs);
        back(&mut tab, &fs);
        assert_eq!(tab.directory, PathBuf::from("/a"));

        // Boundary: no-op.
        back(&mut tab, &fs);
        assert_eq!(tab.directory, PathBuf::from("/a"));
        assert_eq!(tab.history_index, 1);

        forward(&mut tab, &fs);
        forward(&mut tab, &fs);
        assert_eq!(tab.directory, PathBuf::from("/c"));
        forward(&mut tab, &fs);
        assert_eq!(tab.directory, PathBuf::from("/c"));

        back(&mut tab, &fs);
        back(&mut tab, &fs);
        forward(&mut tab, &fs);
        assert_eq!(tab.directory, PathBuf::from("/b"));

        navigate(&mut tab, &fs, "/d");
        assert_eq!(
            tab.history,
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/d")]
        );
        assert!(tab.history_step_forward().is_none());
    }

    #[test]
    fn test_move_cursor_is_clamped() {
        let fs = fs();
        let mut tab = tab_at(&fs, "/a");
        tab.move_cursor(-5);
        assert_eq!(tab.cursor, 0);
        tab.move_cursor(100);
        assert_eq!(tab.cursor, 2);

        tab.change_directory(&fs, Path::new("/c")).unwrap();
        tab.move_cursor(3);
        assert_eq!(tab.cursor, 0);
        assert!(tab.hovered().is_none());
    }

    #[test]
    fn test_jump_to() {
        let fs = fs();
        let mut tab = tab_at(&fs, "/a");
        assert!(tab.jump_to("two"));
        assert_eq!(tab.hovered_name().as_deref(), Some("two"));
        assert!(!tab.jump_to("nope"));
        assert_eq!(tab.hovered_name().as_deref(), Some("two"));
    }

    #[test]
    fn test_close_tabs_until_none_remain() {
        let mut state = FSState::new();
        assert!(!state.select_tab(0));
        assert!(!state.select_tab(2));
        assert!(state.select_tab(0));

        // Closing 0 walks back past the stale 0 entry to 2.
        assert_eq!(state.close_current_tab(), Some(2));
        state.select_tab(2);
        assert_eq!(state.close_current_tab(), None);
    }
}
