//! Error types for archive reading and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while opening, reading, or extracting an archive.
///
/// Reaching the end of an archive is never an error: cursors report it as
/// `Ok(None)`.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed outside of a more specific context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No extension was supplied to select a driver.
    #[error("extension must be provided")]
    MissingExtension,

    /// No registered driver handles the extension.
    #[error("unsupported archive extension: {extension}")]
    UnsupportedExtension {
        /// The normalized extension that was looked up.
        extension: String,
    },

    /// Two drivers claimed the same extension while building a registry.
    #[error("extension {extension} is already registered by the {existing} driver")]
    DuplicateExtension {
        /// The contested extension.
        extension: String,
        /// Name of the driver that registered it first.
        existing: &'static str,
    },

    /// The entry cursor of an archive was requested a second time.
    #[error("archive entries were already consumed; the stream cannot rewind")]
    EntriesConsumed,

    /// The container could not be decoded.
    #[error("invalid archive: {context}")]
    InvalidArchive {
        /// What was being decoded.
        context: String,
        /// Underlying decoder error.
        #[source]
        source: std::io::Error,
    },

    /// The archive holds an entry type that cannot be materialized.
    #[error("unsupported file type in archive ({name}: {type_tag})")]
    UnsupportedEntryType {
        /// Entry name as stored in the archive.
        name: String,
        /// Format-specific type marker.
        type_tag: String,
    },

    /// The content stream of an entry ended before its declared size.
    #[error("entry {name} is truncated: expected {expected} bytes, got {actual}")]
    TruncatedEntry {
        /// Entry name as stored in the archive.
        name: String,
        /// Size declared in the header.
        expected: u64,
        /// Bytes actually available.
        actual: u64,
    },

    /// Entry path resolves outside of the destination directory.
    #[error("content filepath is tainted: {name}")]
    TaintedPath {
        /// Entry name as stored in the archive.
        name: String,
    },

    /// A filesystem operation failed while materializing an entry.
    #[error("failed to {operation} {}: {source}", path.display())]
    Filesystem {
        /// Short description of the operation (e.g. "set permissions on").
        operation: &'static str,
        /// Target path on disk.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No file entry matched a pick predicate.
    #[error("file not found in archive")]
    NotFound,
}

impl ArchiveError {
    /// Wraps a decoder error with a description of what was being read.
    pub(crate) fn invalid_archive(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::InvalidArchive {
            context: context.into(),
            source,
        }
    }

    /// Wraps a filesystem error with the operation and path involved.
    pub(crate) fn filesystem(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarc_core::ArchiveError;
    ///
    /// let err = ArchiveError::TaintedPath {
    ///     name: "../etc/passwd".into(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ArchiveError::NotFound;
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::TaintedPath { .. })
    }

    /// Returns `true` if the error was raised before any archive I/O,
    /// because of how the archive was requested.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingExtension
                | Self::UnsupportedExtension { .. }
                | Self::DuplicateExtension { .. }
                | Self::EntriesConsumed
        )
    }

    /// Returns the archive entry name this error refers to, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarc_core::ArchiveError;
    ///
    /// let err = ArchiveError::UnsupportedEntryType {
    ///     name: "link".into(),
    ///     type_tag: "symlink".into(),
    /// };
    /// assert_eq!(err.entry_name(), Some("link"));
    /// assert_eq!(ArchiveError::MissingExtension.entry_name(), None);
    /// ```
    #[must_use]
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Self::UnsupportedEntryType { name, .. }
            | Self::TruncatedEntry { name, .. }
            | Self::TaintedPath { name } => Some(name),
            _ => None,
        }
    }
}
