//! Path traversal validation.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::types::DestDir;
use crate::types::HeaderType;
use crate::types::SafePath;

/// Validates that an entry name stays inside the destination directory.
///
/// This function delegates to [`SafePath::resolve`]. The check is lexical:
/// no syscalls are made, so it works for destinations that do not exist yet.
///
/// # Errors
///
/// Returns [`ArchiveError::TaintedPath`](crate::ArchiveError::TaintedPath)
/// when the entry would be written outside of `dest`.
///
/// # Examples
///
/// ```no_run
/// use unarc_core::security::validate_path;
/// use unarc_core::types::{DestDir, HeaderType};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
///
/// assert!(validate_path("foo/bar.txt", HeaderType::File, &dest).is_ok());
/// assert!(validate_path("../etc/passwd", HeaderType::File, &dest).is_err());
/// # Ok(())
/// # }
/// ```
pub fn validate_path(name: &str, entry_type: HeaderType, dest: &DestDir) -> Result<SafePath> {
    SafePath::resolve(name, entry_type, dest)
}

/// Normalizes a path without touching the filesystem.
///
/// `.` components are dropped and `..` removes the preceding component.
/// `..` never climbs above a root or prefix.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                );
                if !at_root {
                    normalized.pop();
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
        }
    }

    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_drops_current_dir() {
        assert_eq!(
            normalize_lexically(Path::new("a/./b/./c")),
            PathBuf::from("a/b/c")
        );
    }

    #[test]
    fn test_normalize_folds_parent_dir() {
        assert_eq!(
            normalize_lexically(Path::new("a/b/../c")),
            PathBuf::from("a/c")
        );
        assert_eq!(normalize_lexically(Path::new("a/../..")), PathBuf::new());
    }

    #[test]
    #[cfg(unix)]
    fn test_normalize_stops_at_root() {
        assert_eq!(
            normalize_lexically(Path::new("/tmp/../../etc")),
            PathBuf::from("/etc")
        );
    }

    #[test]
    fn test_validate_path_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        assert!(validate_path("foo/bar.txt", HeaderType::File, &dest).is_ok());
    }

    #[test]
    fn test_validate_path_traversal() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        assert!(validate_path("../etc/passwd", HeaderType::File, &dest).is_err());
    }
}
