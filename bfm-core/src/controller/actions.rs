//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Logical Command Vocabulary
//!
//! Key bindings map keys to free-form command strings (`"tab 3"`,
//! `"plugin compress"`). `Action::parse` turns such a string into the
//! `Action` the dispatcher acts on. Strings that are not part of the
//! vocabulary parse to `None` and are ignored.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::model::entry_filter::EntrySort;

/// Plugin name plus its extra arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCall {
    pub name: CompactString,
    pub args: SmallVec<[String; 4]>,

    /// Runs with the terminal handed over (`iplugin`).
    pub interactive: bool,
}

/// Represents a logical command the dispatcher can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Close the current tab; quit when it was the last one.
    Quit,

    /// Page the generated help file.
    Help,

    /// Switch to tab slot 0..6.
    Tab(usize),

    /// Browse the selection set.
    SelectedFiles,

    /// Start editing the filter.
    Filter,

    /// Clear the filter and re-read the directory.
    Refresh,

    // Cursor
    Down,
    Up,
    Top,
    Bottom,
    DownHalf,
    UpHalf,
    NextSelected,
    PrevSelected,

    // Navigation
    UpDirectory,
    EnterDirectory,
    Home,
    HistoryBack,
    HistoryForward,

    Sort(EntrySort),

    // Selection
    Select,
    SelectAll,
    DeselectAll,

    // Operations delegated to external programs
    Move,
    Copy,
    Open,
    Trash,
    Remove,
    Edit,
    Editor,
    Files,
    CatToNull,
    Shell,

    // Editor buffer operations
    Mkdirs,
    Duplicate,
    Rename,
    BulkRename,

    Plugin(PluginCall),
}

impl Action {
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let head = words.next()?;

        let action = match head {
            "quit" => Self::Quit,
            "help" => Self::Help,
            "tab" => {
                let n: usize = words.next()?.parse().ok()?;
                if !(1..=6).contains(&n) {
                    return None;
                }
                Self::Tab(n - 1)
            }
            "selected_files" => Self::SelectedFiles,
            "filter" => Self::Filter,
            "refresh" => Self::Refresh,
            "down" => Self::Down,
            "up" => Self::Up,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "down_half" => Self::DownHalf,
            "up_half" => Self::UpHalf,
            "next_selected" => Self::NextSelected,
            "prev_selected" => Self::PrevSelected,
            "up_directory" => Self::UpDirectory,
            "enter_directory" => Self::EnterDirectory,
            "home" => Self::Home,
            "history_back" => Self::HistoryBack,
            "history_forward" => Self::HistoryForward,
            "sort_name" => Self::Sort(EntrySort::ByName),
            "sort_modified" => Self::Sort(EntrySort::ByModifiedDesc),
            "sort_size" => Self::Sort(EntrySort::BySizeAsc),
            "select" => Self::Select,
            "select_all" => Self::SelectAll,
            "deselect_all" => Self::DeselectAll,
            "move" => Self::Move,
            "copy" => Self::Copy,
            "open" => Self::Open,
            "trash" => Self::Trash,
            "remove" => Self::Remove,
            "edit" => Self::Edit,
            "editor" => Self::Editor,
            "files" => Self::Files,
            "cat_to_null" => Self::CatToNull,
            "shell" => Self::Shell,
            "mkdirs" => Self::Mkdirs,
            "duplicate" => Self::Duplicate,
            "rename" => Self::Rename,
            "bulk_rename" => Self::BulkRename,
            "plugin" | "iplugin" => Self::Plugin(PluginCall {
                name: CompactString::from(words.next()?),
                args: words.map(str::to_string).collect(),
                interactive: head == "iplugin",
            }),
            _ => return None,
        };

        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtins() {
        assert_eq!(Action::parse("quit"), Some(Action::Quit));
        assert_eq!(Action::parse("tab 3"), Some(Action::Tab(2)));
        assert_eq!(
            Action::parse("sort_modified"),
            Some(Action::Sort(EntrySort::ByModifiedDesc))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_bad_tabs() {
        assert_eq!(Action::parse("none"), None);
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("tab 0"), None);
        assert_eq!(Action::parse("tab 7"), None);
        assert_eq!(Action::parse("tab x"), None);
        assert_eq!(Action::parse("plugin"), None);
    }

    #[test]
    fn test_parse_plugin_with_args() {
        let Some(Action::Plugin(call)) = Action::parse("iplugin autojump FZF") else {
            panic!("expected plugin");
        };
        assert_eq!(call.name, "autojump");
        assert_eq!(call.args.as_slice(), ["FZF".to_string()]);
        assert!(call.interactive);

        let Some(Action::Plugin(call)) = Action::parse("plugin compress") else {
            panic!("expected plugin");
        };
        assert!(!call.interactive);
        assert!(call.args.is_empty());
    }
}
