//! Validated extraction target path.

use std::path::Path;
use std::path::PathBuf;

use super::DestDir;
use super::HeaderType;
use crate::ArchiveError;
use crate::Result;
use crate::security::path::normalize_lexically;

/// An on-disk path that an archive entry may be written to.
///
/// `SafePath` can only be constructed through [`SafePath::resolve`], which
/// guarantees the path lies inside the destination directory.
///
/// # Examples
///
/// ```no_run
/// use unarc_core::types::{DestDir, HeaderType, SafePath};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
///
/// let safe = SafePath::resolve("foo/bar.txt", HeaderType::File, &dest)?;
/// assert!(safe.as_path().starts_with(dest.as_path()));
///
/// assert!(SafePath::resolve("../etc/passwd", HeaderType::File, &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Joins an untrusted entry name onto `dest` and checks the result.
    ///
    /// The joined path is normalized lexically (`.` dropped, `..` folded)
    /// and must stay below `dest`, compared component by component. A
    /// directory entry may resolve to `dest` itself (archives often carry a
    /// `./` entry); a file entry may not.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::TaintedPath`] if the entry escapes `dest`,
    /// is absolute, or contains a NUL byte.
    pub fn resolve(name: &str, entry_type: HeaderType, dest: &DestDir) -> Result<Self> {
        let tainted = || ArchiveError::TaintedPath {
            name: name.to_string(),
        };

        if name.contains('\0') {
            return Err(tainted());
        }

        let entry = Path::new(name);
        if entry.has_root() || entry.is_absolute() {
            return Err(tainted());
        }

        let resolved = normalize_lexically(&dest.as_path().join(entry));
        if !resolved.starts_with(dest.as_path()) {
            return Err(tainted());
        }
        if resolved == dest.as_path() && entry_type.is_file() {
            return Err(tainted());
        }

        Ok(Self(resolved))
    }

    /// Returns the absolute target path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
