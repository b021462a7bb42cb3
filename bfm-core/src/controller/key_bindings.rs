//! src/controller/key_bindings.rs
//! ============================================================================
//! # Key-Binding Resolver
//!
//! Ordered `key -> command` table. A key has at most one command; several
//! keys may share one. Keys are the strings produced by [`key_name`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use indexmap::IndexMap;
use tracing::debug;

use crate::config::Config;

/// Command returned for unbound keys.
pub const NO_COMMAND: &str = "none";

const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    // Application
    ("q", "quit"),
    ("ctrl+c", "quit"),
    ("?", "help"),
    ("1", "tab 1"),
    ("2", "tab 2"),
    ("3", "tab 3"),
    ("4", "tab 4"),
    ("5", "tab 5"),
    ("6", "tab 6"),
    ("ctrl+s", "selected_files"),
    // Filtering
    ("/", "filter"),
    ("ctrl+l", "refresh"),
    // Cursor movement
    ("j", "down"),
    ("k", "up"),
    ("down", "down"),
    ("up", "up"),
    ("g", "top"),
    ("G", "bottom"),
    ("ctrl+d", "down_half"),
    ("ctrl+u", "up_half"),
    ("]", "next_selected"),
    ("[", "prev_selected"),
    // Navigation
    ("h", "up_directory"),
    ("-", "up_directory"),
    ("backspace", "up_directory"),
    ("l", "enter_directory"),
    ("enter", "enter_directory"),
    ("~", "home"),
    ("ctrl+o", "history_back"),
    ("tab", "history_forward"),
    ("a", "iplugin fzcd"),
    // ctrl+/ arrives as ctrl+_ on VT102 compatible terminals
    ("ctrl+_", "iplugin fzjump"),
    ("J", "iplugin autojump"),
    ("ctrl+j", "iplugin autojump FZF"),
    // Sorting
    ("n", "sort_name"),
    ("m", "sort_modified"),
    ("z", "sort_size"),
    // Selection
    ("s", "select"),
    ("A", "select_all"),
    ("d", "deselect_all"),
    // Operations
    ("v", "move"),
    ("c", "copy"),
    ("o", "open"),
    ("e", "edit"),
    ("N", "mkdirs"),
    ("D", "duplicate"),
    ("R", "rename"),
    ("ctrl+r", "bulk_rename"),
    ("T", "trash"),
    ("X", "remove"),
    ("S", "shell"),
    ("V", "editor"),
    ("F", "files"),
    ("C", "plugin compress"),
    ("U", "plugin uncompress"),
    ("P", "plugin preview"),
    ("O", "plugin acrobat"),
    ("L", "plugin quicklook"),
    ("I", "plugin image_compress"),
    ("ctrl+n", "cat_to_null"),
];

#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    table: IndexMap<String, String>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut bindings = Self::new();
        bindings.apply_defaults();
        bindings
    }

    /// Built-in table (when enabled) with the user's bindings applied on top.
    pub fn from_config(config: &Config) -> Self {
        let mut bindings = Self::new();
        if config.default_bindings {
            bindings.apply_defaults();
        }
        for b in &config.bindings {
            bindings.set_binding(&b.key, &b.command);
        }
        debug!("{} key bindings installed", bindings.len());
        bindings
    }

    fn apply_defaults(&mut self) {
        for (key, command) in DEFAULT_BINDINGS {
            self.set_binding(key, command);
        }
    }

    /// Replace any binding for `key`, appending the new one at the end.
    pub fn set_binding(&mut self, key: &str, command: &str) {
        self.table.shift_remove(key);
        self.table.insert(key.to_string(), command.to_string());
    }

    pub fn resolve(&self, key: &str) -> &str {
        self.table.get(key).map_or(NO_COMMAND, String::as_str)
    }

    /// Every key bound to `command`, in table order.
    pub fn keys_for(&self, command: &str) -> Vec<&str> {
        self.table
            .iter()
            .filter(|(_, c)| c.as_str() == command)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Table key for a terminal key event. `None` for releases and keys the
/// table has no name for.
pub fn key_name(key: &KeyEvent) -> Option<String> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let name = match key.code {
        KeyCode::Char(c) if ctrl => {
            let c = match c {
                '/' | '7' => '_',
                c => c.to_ascii_lowercase(),
            };
            format!("ctrl+{c}")
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "shift+tab".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdown".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };

    Some(name)
}
