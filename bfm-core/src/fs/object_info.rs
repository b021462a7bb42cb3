//! `src/fs/object_info.rs`
//! ============================================================
//! Directory entry metadata as seen by the tab model.
//!
//! Metadata is read once at listing time. Fields that could not be obtained
//! stay `None` so sorting can place them deterministically instead of failing
//! the whole listing.

use std::fs::{self, Metadata};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use compact_str::CompactString;

// ------------------------------------------------------------
// ObjectInfo: one entry of a directory listing.
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Entry name relative to its directory.
    pub name: CompactString,

    /// Last modification time, `None` when metadata was unavailable.
    pub modified: Option<SystemTime>,

    /// Byte length, `None` when metadata was unavailable.
    pub size: Option<u64>,

    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ObjectInfo {
    /// Build from a `std::fs::DirEntry`. The entry's own type is used, so a
    /// symlink is reported as a symlink even when it points at a directory.
    pub fn from_dir_entry(entry: &fs::DirEntry) -> Self {
        let name = CompactString::from(entry.file_name().to_string_lossy());

        let (is_dir, is_symlink) = entry
            .file_type()
            .map(|ft| (ft.is_dir(), ft.is_symlink()))
            .unwrap_or((false, false));

        let metadata: Option<Metadata> = entry.metadata().ok();

        Self {
            name,
            modified: metadata.as_ref().and_then(|m| m.modified().ok()),
            size: metadata.as_ref().map(Metadata::len),
            is_dir,
            is_symlink,
        }
    }

    /// Regular file with known metadata.
    pub fn file(name: &str, size: u64, modified: SystemTime) -> Self {
        Self {
            name: CompactString::from(name),
            modified: Some(modified),
            size: Some(size),
            is_dir: false,
            is_symlink: false,
        }
    }

    /// Directory entry without metadata.
    pub fn dir(name: &str) -> Self {
        Self {
            name: CompactString::from(name),
            modified: None,
            size: None,
            is_dir: true,
            is_symlink: false,
        }
    }

    /// Local-time modification stamp for display, empty when unknown.
    pub fn modified_display(&self) -> String {
        self.modified
            .map(|m| {
                let local: DateTime<Local> = m.into();
                local.format("%Y-%m-%d %H:%M").to_string()
            })
            .unwrap_or_default()
    }
}
