//! `src/model/selection.rs`
//! Cross-directory multi-selection.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::trace;

use crate::model::fs_state::Tab;

/// One selected entry: the absolute directory it lives in and its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectedEntry {
    pub directory: PathBuf,
    pub name: CompactString,
}

impl SelectedEntry {
    pub fn path(&self) -> PathBuf {
        self.directory.join(self.name.as_str())
    }
}

/// Unordered, unique on `(directory, name)`.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    entries: Vec<SelectedEntry>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, directory: &Path, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.directory == directory && e.name == name)
    }

    pub fn contains(&self, directory: &Path, name: &str) -> bool {
        self.position(directory, name).is_some()
    }

    pub fn select(&mut self, directory: &Path, name: &str) {
        if !self.contains(directory, name) {
            self.entries.push(SelectedEntry {
                directory: directory.to_path_buf(),
                name: CompactString::from(name),
            });
        }
    }

    pub fn toggle(&mut self, directory: &Path, name: &str) {
        match self.position(directory, name) {
            Some(i) => {
                self.entries.swap_remove(i);
                trace!("Deselected {}", name);
            }
            None => {
                self.select(directory, name);
                trace!("Selected {}", name);
            }
        }
    }

    pub fn select_all(&mut self, tab: &Tab) {
        for entry in &tab.filtered_entries {
            self.select(&tab.absolute_directory, &entry.name);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedEntry> {
        self.entries.iter()
    }

    /// Ordered by directory, then name.
    pub fn sorted(&self) -> Vec<SelectedEntry> {
        let mut out = self.entries.clone();
        out.sort();
        out
    }

    /// Absolute paths in display order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.sorted().iter().map(SelectedEntry::path).collect()
    }

    /// Ascending indices into `tab.filtered_entries` of selected entries.
    pub fn indices_in(&self, tab: &Tab) -> Vec<usize> {
        tab.filtered_entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.contains(&tab.absolute_directory, &e.name))
            .map(|(i, _)| i)
            .collect()
    }
}
