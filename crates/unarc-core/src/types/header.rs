//! Normalized archive entry metadata.

use std::fmt;
use std::time::SystemTime;

/// Type of an entry in an archive.
///
/// Only regular files and directories can be represented. Drivers reject
/// every other entry type (symlinks, hardlinks, devices, fifos) with
/// [`ArchiveError::UnsupportedEntryType`](crate::ArchiveError::UnsupportedEntryType)
/// instead of producing a header for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderType {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,
}

impl HeaderType {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for HeaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// Metadata about one entry of an archive, independent of its format.
///
/// A header is produced by an [`Entries`](crate::formats::Entries) cursor and
/// never changes afterwards. For [`HeaderType::File`] entries, exactly
/// [`size`](Self::size) content bytes can be read from the cursor before the
/// next header is requested.
///
/// Fields a format does not record are `None`: zip stores neither access
/// time nor ownership, tar only stores access time in GNU or PAX headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Entry path as stored in the archive. Untrusted: may contain `..`
    /// segments or look absolute.
    pub name: String,

    /// Entry type.
    pub entry_type: HeaderType,

    /// Content length in bytes, 0 for directories.
    pub size: u64,

    /// Permission bits (masked with `0o7777`).
    pub mode: u32,

    /// Last access time.
    pub access_time: Option<SystemTime>,

    /// Last modification time.
    pub mod_time: Option<SystemTime>,

    /// Numeric owner id.
    pub uid: Option<u32>,

    /// Numeric group id.
    pub gid: Option<u32>,
}

impl Header {
    /// Permission bits kept from format-specific mode fields.
    pub const MODE_MASK: u32 = 0o7777;

    /// Creates a header with the given name and type and no optional metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, entry_type: HeaderType) -> Self {
        let mode = match entry_type {
            HeaderType::File => 0o644,
            HeaderType::Directory => 0o755,
        };
        Self {
            name: name.into(),
            entry_type,
            size: 0,
            mode,
            access_time: None,
            mod_time: None,
            uid: None,
            gid: None,
        }
    }

    /// Returns `true` if the entry is a regular file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// Returns `true` if the entry is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.entry_type.is_directory()
    }

    /// Returns the owner and group ids when the format recorded both.
    #[must_use]
    pub const fn ownership(&self) -> Option<(u32, u32)> {
        match (self.uid, self.gid) {
            (Some(uid), Some(gid)) => Some((uid, gid)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_type_predicates() {
        assert!(HeaderType::File.is_file());
        assert!(!HeaderType::File.is_directory());
        assert!(HeaderType::Directory.is_directory());
        assert!(!HeaderType::Directory.is_file());
    }

    #[test]
    fn test_header_type_display() {
        assert_eq!(HeaderType::File.to_string(), "file");
        assert_eq!(HeaderType::Directory.to_string(), "directory");
    }

    #[test]
    fn test_new_header_defaults() {
        let file = Header::new("file.txt", HeaderType::File);
        assert_eq!(file.mode, 0o644);
        assert_eq!(file.size, 0);
        assert!(file.mod_time.is_none());

        let dir = Header::new("dir/", HeaderType::Directory);
        assert_eq!(dir.mode, 0o755);
        assert!(dir.is_directory());
    }

    #[test]
    fn test_ownership_requires_both_ids() {
        let mut header = Header::new("file.txt", HeaderType::File);
        assert_eq!(header.ownership(), None);

        header.uid = Some(1000);
        assert_eq!(header.ownership(), None);

        header.gid = Some(100);
        assert_eq!(header.ownership(), Some((1000, 100)));
    }
}
