//! src/view/help.rs
//! ============================================================================
//! # Help text
//!
//! Plain-text key reference built from the live binding table, so rebinding
//! a key is reflected in the help. Plugins from the registry are listed under
//! the section they name. The text is written once at startup and paged by
//! the `help` command.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, info};

use crate::config::PluginEntry;
use crate::controller::key_bindings::KeyBindings;
use crate::error::{AppError, AppResult};

const KEY_COLUMN: usize = 16;

/// Where the keys of a help line come from.
enum Keys {
    /// Keys bound to each command, commands joined by `/`.
    Bound(&'static [&'static str]),

    /// Fixed key handled by a mode rather than the binding table.
    Fixed(&'static str),
}

struct Section {
    title: &'static str,
    lines: &'static [(Keys, &'static str)],
}

const SECTIONS: &[Section] = &[
    Section {
        title: "Application",
        lines: &[
            (Keys::Bound(&["quit"]), "Quit"),
            (Keys::Bound(&["help"]), "Help"),
            (Keys::Bound(&["tab 1"]), "Activate tab 1"),
            (Keys::Bound(&["tab 2"]), "Activate tab 2"),
            (Keys::Bound(&["tab 3"]), "Activate tab 3"),
            (Keys::Bound(&["tab 4"]), "Activate tab 4"),
            (Keys::Bound(&["tab 5"]), "Activate tab 5"),
            (Keys::Bound(&["tab 6"]), "Activate tab 6"),
            (Keys::Bound(&["selected_files"]), "View selected files"),
        ],
    },
    Section {
        title: "Filtering",
        lines: &[
            (Keys::Bound(&["filter"]), "Filter files (current tab only)"),
            (Keys::Fixed("enter"), "Apply  filter, back to COMMAND mode"),
            (Keys::Fixed("escape"), "Cancel filter, back to COMMAND mode"),
            (Keys::Bound(&["refresh"]), "Clear filter (works in either mode)"),
            (Keys::Fixed("ctrl+w"), "Backspace until space (delete word)"),
        ],
    },
    Section {
        title: "Cursor Movement",
        lines: &[
            (Keys::Bound(&["down", "up"]), "Next/Prev file"),
            (Keys::Bound(&["top", "bottom"]), "First/Last file"),
            (Keys::Bound(&["down_half", "up_half"]), "Half page down/up"),
            (
                Keys::Bound(&["next_selected", "prev_selected"]),
                "Next/Prev selected file",
            ),
        ],
    },
    Section {
        title: "Navigation",
        lines: &[
            (Keys::Bound(&["up_directory"]), "Parent directory"),
            (Keys::Bound(&["enter_directory"]), "Enter hovered directory"),
            (Keys::Bound(&["home"]), "Home directory"),
            (
                Keys::Bound(&["history_back", "history_forward"]),
                "Back/Next in jumplist",
            ),
        ],
    },
    Section {
        title: "Sorting",
        lines: &[
            (Keys::Bound(&["sort_name"]), "Sort by name"),
            (Keys::Bound(&["sort_modified"]), "Sort by last modified"),
            (Keys::Bound(&["sort_size"]), "Sort by size (reverse)"),
        ],
    },
    Section {
        title: "Selection",
        lines: &[
            (Keys::Bound(&["select"]), "Toggle select on file/directory"),
            (Keys::Bound(&["select_all"]), "Select all files"),
            (Keys::Bound(&["deselect_all"]), "Deselect All Files"),
        ],
    },
    Section {
        title: "Operations",
        lines: &[
            (Keys::Bound(&["move"]), "Move selected files to current directory"),
            (Keys::Bound(&["copy"]), "Copy selected files to current directory"),
            (Keys::Bound(&["open"]), "Open file(s) (with open command/alias)"),
            (Keys::Bound(&["edit"]), "Edit file (with EDITOR environment variable)"),
            (Keys::Bound(&["mkdirs"]), "Create New directory(ies)"),
            (Keys::Bound(&["duplicate"]), "Duplicate file"),
            (Keys::Bound(&["rename"]), "Rename hovered file"),
            (Keys::Bound(&["bulk_rename"]), "Bulk Rename with EDITOR"),
            (Keys::Bound(&["trash"]), "Trash file (with trash command)"),
            (
                Keys::Bound(&["remove"]),
                "Remove selected or hovered file(s)/directory(s) (with rm -rf command)",
            ),
            (
                Keys::Bound(&["shell"]),
                "Open Shell in current directory (exit to return)",
            ),
            (
                Keys::Bound(&["editor"]),
                "Open EDITOR in current directory (close to return)",
            ),
            (Keys::Bound(&["files"]), "Open file manager in current directory"),
            (
                Keys::Bound(&["cat_to_null"]),
                "Cat the file to /dev/null to trigger OneDrive sync",
            ),
        ],
    },
];

fn bound_keys(bindings: &KeyBindings, command: &str) -> String {
    bindings.keys_for(command).join(",")
}

fn write_line(doc: &mut String, keys: &str, description: &str) {
    let _ = writeln!(doc, "    {keys:<KEY_COLUMN$} - {description}");
}

/// Full help text for the current bindings and plugin registry.
pub fn generate_help(bindings: &KeyBindings, plugins: &[PluginEntry]) -> String {
    let mut doc = String::new();

    for (i, section) in SECTIONS.iter().enumerate() {
        if i > 0 {
            doc.push_str("\n\n");
        }
        doc.push_str(section.title);
        doc.push('\n');

        for (keys, description) in section.lines {
            let keys = match keys {
                Keys::Bound(commands) => commands
                    .iter()
                    .map(|c| bound_keys(bindings, c))
                    .collect::<Vec<_>>()
                    .join("/"),
                Keys::Fixed(key) => (*key).to_string(),
            };
            write_line(&mut doc, &keys, description);
        }

        let mut section_plugins = plugins
            .iter()
            .filter(|p| p.section == section.title)
            .peekable();
        if section_plugins.peek().is_some() {
            doc.push_str("\n  Plugins:\n");
            for plugin in section_plugins {
                write_line(&mut doc, &bound_keys(bindings, &plugin.command), &plugin.help);
            }
        }
    }

    debug!("Generated help, {} bytes", doc.len());
    doc
}

/// Write the help text, creating parent directories as needed.
pub fn write_help(path: &Path, help: &str) -> AppResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::file_operation_failed("create", dir, e.to_string()))?;
    }

    std::fs::write(path, help)
        .map_err(|e| AppError::file_operation_failed("write", path, e.to_string()))?;
    info!("Wrote help to {}", path.display());
    Ok(())
}
