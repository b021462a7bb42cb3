//! ``src/fs/dir_scanner.rs``
//!
//! # `Directory Scanner`: Filesystem Listing Collaborator
//!
//! The tab model never touches `std::fs` directly; it goes through the
//! [`FileSystem`] trait so the dispatcher can be driven by an in-memory
//! listing in tests.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::fs::object_info::ObjectInfo;

/// Read-only filesystem queries needed by the core.
pub trait FileSystem: Send + Sync {
    /// List `path`, ordered by name. Fails with `DirectoryUnavailable`.
    fn list_directory(&self, path: &Path) -> AppResult<Vec<ObjectInfo>>;

    /// True when `entry` inside `dir` is a symlink whose target is a directory.
    fn is_dir_via_symlink(&self, dir: &Path, entry: &ObjectInfo) -> bool;

    /// True when `path` is a regular file (symlinks followed).
    fn is_regular_file(&self, path: &Path) -> bool;
}

/// `std::fs` backed implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list_directory(&self, path: &Path) -> AppResult<Vec<ObjectInfo>> {
        let start_time = Instant::now();

        let read_dir =
            std::fs::read_dir(path).map_err(|e| AppError::directory_unavailable(path, e))?;

        let mut entries: Vec<ObjectInfo> = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => entries.push(ObjectInfo::from_dir_entry(&entry)),
                Err(e) => {
                    // Log the error but continue processing other entries
                    info!("Failed to read entry in {:?}: {}", path, e);
                }
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            marker = "DIRECTORY_SCAN",
            entries = entries.len(),
            "Listed {} in {:?}",
            path.display(),
            start_time.elapsed()
        );

        Ok(entries)
    }

    fn is_dir_via_symlink(&self, dir: &Path, entry: &ObjectInfo) -> bool {
        if !entry.is_symlink {
            return false;
        }

        // Broken links are common; they are simply not directories.
        std::fs::metadata(dir.join(entry.name.as_str()))
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path();

        std::fs::write(path.join("b.txt"), b"hello").unwrap();
        std::fs::write(path.join("a.txt"), b"").unwrap();
        std::fs::write(path.join(".hidden"), b"").unwrap();
        std::fs::create_dir(path.join("subdir")).unwrap();

        temp_dir
    }

    #[test]
    fn test_list_directory_sorted_by_name() {
        let temp_dir = create_test_directory();
        let entries = LocalFileSystem.list_directory(temp_dir.path()).unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".hidden", "a.txt", "b.txt", "subdir"]);

        let b = entries.iter().find(|e| e.name == "b.txt").unwrap();
        assert_eq!(b.size, Some(5));
        assert!(entries.iter().find(|e| e.name == "subdir").unwrap().is_dir);
    }

    #[test]
    fn test_list_missing_directory_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        let err = LocalFileSystem.list_directory(&missing).unwrap_err();
        assert!(err.is_directory_unavailable());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_directory() {
        let temp_dir = create_test_directory();
        let path = temp_dir.path();
        std::os::unix::fs::symlink(path.join("subdir"), path.join("link")).unwrap();
        std::os::unix::fs::symlink(path.join("nowhere"), path.join("broken")).unwrap();

        let entries = LocalFileSystem.list_directory(path).unwrap();
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        let broken = entries.iter().find(|e| e.name == "broken").unwrap();

        assert!(link.is_symlink);
        assert!(LocalFileSystem.is_dir_via_symlink(path, link));
        assert!(!LocalFileSystem.is_dir_via_symlink(path, broken));
        assert!(LocalFileSystem.is_regular_file(&path.join("a.txt")));
        assert!(!LocalFileSystem.is_regular_file(&path.join("subdir")));
    }
}
