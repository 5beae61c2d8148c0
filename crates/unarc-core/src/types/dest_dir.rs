//! Destination directory type.

use crate::ArchiveError;
use crate::Result;
use crate::security::path::normalize_lexically;
use std::path::Path;
use std::path::PathBuf;

/// An absolute, normalized destination directory for archive extraction.
///
/// The directory does not need to exist yet: it is created on demand when
/// the first entry is materialized. When it does exist it must be a
/// directory, and its canonical path is used so that symlinked destinations
/// compare correctly against extracted entry paths.
///
/// # Examples
///
/// ```no_run
/// use unarc_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/extraction")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists but is not a directory
    /// - The path exists but cannot be canonicalized
    /// - The current directory cannot be determined for a relative path
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        match std::fs::metadata(&path) {
            Ok(metadata) if !metadata.is_dir() => Err(ArchiveError::filesystem(
                "extract into",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            )),
            Ok(_) => {
                let canonical = path
                    .canonicalize()
                    .map_err(|e| ArchiveError::filesystem("canonicalize", &path, e))?;
                Ok(Self(canonical))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let absolute = std::path::absolute(&path)
                    .map_err(|e| ArchiveError::filesystem("resolve", &path, e))?;
                Ok(Self(normalize_lexically(&absolute)))
            }
            Err(e) => Err(ArchiveError::filesystem("inspect", path, e)),
        }
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_existing() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_missing_is_normalized() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let missing = temp.path().join("out").join(".").join("nested").join("..");
        let dest = DestDir::new(missing).expect("missing dest is allowed");

        assert!(dest.as_path().is_absolute());
        assert!(dest.as_path().ends_with("out"));
        assert!(!dest.as_path().exists());
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        let result = DestDir::new(file_path);
        assert!(matches!(result, Err(ArchiveError::Filesystem { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_with_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let symlink_path = temp.path().join("link");
        symlink(&real_dir, &symlink_path).expect("failed to create symlink");

        let dest = DestDir::new(symlink_path).expect("should create from symlink");
        assert_eq!(dest.as_path(), real_dir.canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_into_path_buf() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("should create");
        let path = dest.clone().into_path_buf();
        assert_eq!(path, dest.as_path());
    }
}
