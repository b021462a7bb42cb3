//! src/tasks/edit_task.rs
//! ============================================================================
//! # Editor buffer operations
//!
//! Rename, duplicate, mkdirs and bulk rename let the user type names in
//! `$EDITOR`. A temp buffer is written, the editor runs on it, and once it
//! exits successfully the buffer is read back and applied. Lines starting
//! with `;` are comments.

use std::io::Write;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tempfile::{Builder, TempPath};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::fs::dir_scanner::FileSystem;
use crate::model::fs_state::Tab;
use crate::tasks::process_task::{ProcessRequest, StdioMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    Rename { source: CompactString },
    Duplicate { source: CompactString },
    Mkdirs,
    BulkRename { sources: Vec<CompactString> },
}

impl std::fmt::Display for EditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rename { .. } => "rename",
            Self::Duplicate { .. } => "duplicate",
            Self::Mkdirs => "mkdirs",
            Self::BulkRename { .. } => "bulk rename",
        };
        write!(f, "{s}")
    }
}

/// An editor buffer waiting for the editor to exit.
#[derive(Debug)]
pub struct EditSession {
    pub kind: EditKind,

    /// Directory every name in the buffer is relative to.
    pub directory: PathBuf,

    pub buffer: TempPath,
}

fn is_comment(line: &str) -> bool {
    line.starts_with(';')
}

/// Non-comment lines of an edited buffer, in order.
pub fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !is_comment(l))
        .collect()
}

/// Buffer for a single-name edit: the name, the directory, then the other
/// names for reference.
fn single_name_buffer(first: &str, tab: &Tab, skip: Option<&str>) -> String {
    let mut doc = format!("{first}\n; CWD: {}\n", tab.directory.display());
    for entry in &tab.entries {
        if Some(entry.name.as_str()) != skip {
            doc.push_str(&format!("; {}\n", entry.name));
        }
    }
    doc
}

fn write_buffer(tmp_dir: &Path, prefix: &str, contents: &str) -> AppResult<TempPath> {
    let mut file = Builder::new()
        .prefix(prefix)
        .tempfile_in(tmp_dir)
        .map_err(|e| AppError::file_operation_failed("create buffer", tmp_dir, e.to_string()))?;
    file.write_all(contents.as_bytes())?;

    let path = file.into_temp_path();
    info!("Created TMP File: {}", path.display());
    Ok(path)
}

impl EditSession {
    /// `None` when the directory is empty.
    pub fn rename(tab: &Tab, tmp_dir: &Path) -> AppResult<Option<Self>> {
        let Some(source) = tab.hovered_name() else {
            return Ok(None);
        };

        let contents = single_name_buffer(&source, tab, Some(source.as_str()));
        Ok(Some(Self {
            buffer: write_buffer(tmp_dir, "M-RENAME-", &contents)?,
            directory: tab.absolute_directory.clone(),
            kind: EditKind::Rename { source },
        }))
    }

    /// The hovered entry must be a regular file.
    pub fn duplicate(tab: &Tab, fs: &dyn FileSystem, tmp_dir: &Path) -> AppResult<Option<Self>> {
        let (Some(source), Some(path)) = (tab.hovered_name(), tab.hovered_path()) else {
            return Ok(None);
        };

        if !fs.is_regular_file(&path) {
            return Err(AppError::invalid_input(
                "duplicate",
                "Cursor must be over a file regular file to duplicate.",
            ));
        }

        let contents = single_name_buffer(&source, tab, Some(source.as_str()));
        Ok(Some(Self {
            buffer: write_buffer(tmp_dir, "M-DUP-", &contents)?,
            directory: tab.absolute_directory.clone(),
            kind: EditKind::Duplicate { source },
        }))
    }

    pub fn mkdirs(tab: &Tab, tmp_dir: &Path) -> AppResult<Self> {
        let contents = single_name_buffer("NewDirectory", tab, None);
        Ok(Self {
            buffer: write_buffer(tmp_dir, "M-MKDIR-", &contents)?,
            directory: tab.absolute_directory.clone(),
            kind: EditKind::Mkdirs,
        })
    }

    /// Every filtered name, one per line.
    pub fn bulk_rename(tab: &Tab, tmp_dir: &Path) -> AppResult<Self> {
        let sources: Vec<CompactString> =
            tab.filtered_entries.iter().map(|e| e.name.clone()).collect();

        let mut contents = String::new();
        for name in &sources {
            contents.push_str(name);
            contents.push('\n');
        }
        contents.push_str(&format!("; CWD: {}\n", tab.directory.display()));

        Ok(Self {
            buffer: write_buffer(tmp_dir, "M-BRENAME-", &contents)?,
            directory: tab.absolute_directory.clone(),
            kind: EditKind::BulkRename { sources },
        })
    }

    /// Editor run on the buffer. `editor` may carry its own arguments.
    pub fn editor_request(&self, editor: &str) -> ProcessRequest {
        let mut words = editor.split_whitespace();
        let program = words.next().unwrap_or("vim").to_string();
        let mut args: Vec<String> = words.map(str::to_string).collect();
        args.push(self.buffer.to_string_lossy().into_owned());

        ProcessRequest::new(program, args, StdioMode::Terminal)
            .in_dir(&self.directory)
            .expecting_errors()
    }

    /// Read the edited buffer and perform the operation. Returns the
    /// messages to show the user. The buffer is deleted afterwards.
    pub fn apply(self) -> Vec<String> {
        let text = match std::fs::read_to_string(&self.buffer) {
            Ok(text) => text,
            Err(e) => {
                return vec![format!(
                    "Error opening temporary file {}:{}",
                    self.buffer.display(),
                    e
                )];
            }
        };

        let lines = content_lines(&text);
        debug!("Applying {} with {} lines", self.kind, lines.len());

        match &self.kind {
            EditKind::Rename { source } => {
                let target = lines.first().copied().unwrap_or_default();
                rename_one(&self.directory, source, target).into_iter().collect()
            }
            EditKind::Duplicate { source } => {
                let target = lines.first().copied().unwrap_or_default();
                duplicate_one(&self.directory, source, target)
                    .into_iter()
                    .collect()
            }
            EditKind::Mkdirs => make_dirs(&self.directory, &lines),
            EditKind::BulkRename { sources } => bulk_rename(&self.directory, sources, &lines),
        }
    }
}

fn rename_one(dir: &Path, source: &str, target: &str) -> Option<String> {
    if target.is_empty() || target == source {
        debug!("{} not renamed", source);
        return None;
    }

    let (src, dst) = (dir.join(source), dir.join(target));
    match std::fs::rename(&src, &dst) {
        Ok(()) => {
            info!("Renamed {} to {}", source, target);
            None
        }
        Err(e) => Some(format!(
            "Error renaming {} to {}: {}",
            src.display(),
            dst.display(),
            e
        )),
    }
}

fn duplicate_one(dir: &Path, source: &str, target: &str) -> Option<String> {
    if target.is_empty() || target == source {
        return None;
    }

    let (src, dst) = (dir.join(source), dir.join(target));
    match std::fs::copy(&src, &dst) {
        Ok(bytes) => {
            info!("Copied {} to {} ({} bytes)", source, target, bytes);
            None
        }
        Err(e) => Some(format!(
            "Error copying {} to {}: {}",
            src.display(),
            dst.display(),
            e
        )),
    }
}

fn make_dirs(dir: &Path, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .filter_map(|name| {
            let path = dir.join(name);
            match std::fs::create_dir_all(&path) {
                Ok(()) => {
                    info!("Made directory {}", path.display());
                    None
                }
                Err(e) => Some(format!("Error creating directory {}: {}", path.display(), e)),
            }
        })
        .collect()
}

/// Problems that abort a bulk rename before anything is touched.
pub fn bulk_rename_issues(sources: &[CompactString], targets: &[&str]) -> Vec<String> {
    targets
        .iter()
        .zip(sources)
        .filter(|(dst, src)| **dst != src.as_str() && sources.iter().any(|s| s.as_str() == **dst))
        .map(|(dst, _)| format!("Destination {dst} is a source.  Possible Loop."))
        .collect()
}

fn bulk_rename(dir: &Path, sources: &[CompactString], targets: &[&str]) -> Vec<String> {
    let issues = bulk_rename_issues(sources, targets);
    if !issues.is_empty() {
        return vec![issues.join("\n")];
    }

    let mut messages = Vec::new();
    for (i, target) in targets.iter().enumerate() {
        match sources.get(i) {
            Some(source) => messages.extend(rename_one(dir, source, target)),
            None if target.trim().is_empty() => {}
            None => messages.push(format!("no src file name for line {}", i + 1)),
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::dir_scanner::LocalFileSystem;
    use tempfile::TempDir;

    fn tab_in(dir: &Path) -> Tab {
        let mut tab = Tab::default();
        tab.change_directory(&LocalFileSystem, dir).unwrap();
        tab
    }

    fn setup() -> (TempDir, TempDir) {
        let work = TempDir::new().unwrap();
        std::fs::write(work.path().join("a.txt"), b"a").unwrap();
        std::fs::write(work.path().join("b.txt"), b"b").unwrap();
        std::fs::create_dir(work.path().join("sub")).unwrap();
        (work, TempDir::new().unwrap())
    }

    #[test]
    fn test_rename_buffer_and_apply() {
        let (work, tmp) = setup();
        let tab = tab_in(work.path());
        let session = EditSession::rename(&tab, tmp.path()).unwrap().unwrap();

        let buffer = std::fs::read_to_string(&session.buffer).unwrap();
        assert!(buffer.starts_with("a.txt\n; CWD: "));
        assert!(buffer.contains("; b.txt\n"));
        assert!(!buffer.contains("; a.txt\n"));

        std::fs::write(&session.buffer, "renamed.txt\n; CWD: whatever\n").unwrap();
        let buffer_path = session.buffer.to_path_buf();
        assert!(session.apply().is_empty());

        assert!(work.path().join("renamed.txt").exists());
        assert!(!work.path().join("a.txt").exists());
        assert!(!buffer_path.exists());
    }

    #[test]
    fn test_duplicate_requires_regular_file() {
        let (work, tmp) = setup();
        let mut tab = tab_in(work.path());
        assert!(tab.jump_to("sub"));

        let err = EditSession::duplicate(&tab, &LocalFileSystem, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("Cursor must be over a file regular file to duplicate."));

        assert!(tab.jump_to("b.txt"));
        let session = EditSession::duplicate(&tab, &LocalFileSystem, tmp.path())
            .unwrap()
            .unwrap();
        std::fs::write(&session.buffer, "c.txt\n").unwrap();
        assert!(session.apply().is_empty());
        assert_eq!(std::fs::read(work.path().join("c.txt")).unwrap(), b"b");
    }

    #[test]
    fn test_mkdirs_creates_every_line() {
        let (work, tmp) = setup();
        let tab = tab_in(work.path());
        let session = EditSession::mkdirs(&tab, tmp.path()).unwrap();
        std::fs::write(&session.buffer, "one\n; comment\n\ntwo/nested\n").unwrap();

        assert!(session.apply().is_empty());
        assert!(work.path().join("one").is_dir());
        assert!(work.path().join("two/nested").is_dir());
        assert!(!work.path().join("; comment").exists());
    }

    #[test]
    fn test_bulk_rename_detects_loops_and_aborts() {
        let (work, tmp) = setup();
        let tab = tab_in(work.path());
        let session = EditSession::bulk_rename(&tab, tmp.path()).unwrap();
        assert_eq!(
            session.kind,
            EditKind::BulkRename {
                sources: vec!["a.txt".into(), "b.txt".into(), "sub".into()]
            }
        );

        std::fs::write(&session.buffer, "b.txt\na.txt\nsub\n").unwrap();
        let messages = session.apply();
        assert_eq!(
            messages,
            vec!["Destination b.txt is a source.  Possible Loop.\nDestination a.txt is a source.  Possible Loop.".to_string()]
        );
        assert_eq!(std::fs::read(work.path().join("a.txt")).unwrap(), b"a");
    }

    #[test]
    fn test_bulk_rename_applies_and_reports_extra_lines() {
        let (work, tmp) = setup();
        let tab = tab_in(work.path());
        let session = EditSession::bulk_rename(&tab, tmp.path()).unwrap();
        std::fs::write(&session.buffer, "x.txt\nb.txt\nsub\nextra\n; CWD: /\n").unwrap();

        assert_eq!(session.apply(), vec!["no src file name for line 4".to_string()]);
        assert!(work.path().join("x.txt").exists());
        assert!(work.path().join("b.txt").exists());
    }

    #[test]
    fn test_destination_collisions_are_not_detected() {
        let sources: Vec<CompactString> = vec!["a".into(), "b".into()];
        assert!(bulk_rename_issues(&sources, &["c", "c"]).is_empty());
    }

    #[test]
    fn test_editor_request_appends_buffer() {
        let (work, tmp) = setup();
        let session = EditSession::mkdirs(&tab_in(work.path()), tmp.path()).unwrap();
        let req = session.editor_request("code -w");
        assert_eq!(req.program, "code");
        assert_eq!(req.args[0], "-w");
        assert_eq!(req.args[1], session.buffer.to_string_lossy());
        assert!(req.error_expected);
    }
}
