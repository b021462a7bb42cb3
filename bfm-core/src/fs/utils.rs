//! `src/fs/utils.rs`
//! Path helpers shared by the tab model and the plugin protocol.

use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Lexically clean `path`, resolving it against `base` when relative.
///
/// `.` components are dropped and `..` pops the previous component; the
/// root is never popped. Symlinks are not consulted.
pub fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if out.parent().is_some() {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(Component::RootDir.as_os_str());
    }
    out
}

/// Parent of a cleaned absolute path; the root is its own parent.
pub fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}

/// Follow a symlink chain to its final target.
pub fn resolve_symlink(path: &Path) -> AppResult<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        AppError::file_operation_failed("resolve", path, e.to_string())
    })
}

/// Directory used for plugin state/command files, editor buffers and error
/// reports. Honors `$TMPDIR`.
pub fn temp_dir() -> PathBuf {
    std::env::var_os("TMPDIR")
        .filter(|v| !v.is_empty())
        .map_or_else(std::env::temp_dir, PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative_and_parent() {
        let base = Path::new("/home/user");
        assert_eq!(
            normalize_path(base, Path::new("docs/../music/./x")),
            PathBuf::from("/home/user/music/x")
        );
        assert_eq!(normalize_path(base, Path::new("/tmp")), PathBuf::from("/tmp"));
        assert_eq!(normalize_path(base, Path::new("../../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(parent_dir(Path::new("/")), PathBuf::from("/"));
        assert_eq!(parent_dir(Path::new("/a/b")), PathBuf::from("/a"));
    }
}
