//! Common traits for archive format handlers.
//!
//! A [`Driver`] is a stateless factory registered once per format. Opening an
//! input through a driver yields a [`Archive`], which owns the decode pipeline
//! and hands out a single forward-only [`Entries`] cursor.

use std::fmt;
use std::io::Read;

use crate::Result;
use crate::types::Header;

/// Input stream handed to a driver.
pub type ArchiveReader = Box<dyn Read + Send>;

/// Factory for one archive format.
pub trait Driver: Send + Sync {
    /// Returns the driver name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Returns the normalized extensions (no leading dot) this driver handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Opens `reader` as an archive of the given normalized extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not one of
    /// [`extensions`](Self::extensions) or the container cannot be decoded.
    fn open(&self, reader: ArchiveReader, extension: &str) -> Result<Box<dyn Archive>>;
}

/// An opened archive.
///
/// The archive owns its input stream and every decoder stacked on it. All of
/// them are released by [`close`](Self::close), or when the box is dropped.
pub trait Archive: Send {
    /// Returns the archive format name.
    fn format_name(&self) -> &'static str;

    /// Hands out the entry cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::EntriesConsumed`](crate::ArchiveError::EntriesConsumed)
    /// when called a second time, or a decode error if the container cannot
    /// be read.
    fn entries(&mut self) -> Result<Entries<'_>>;

    /// Releases the input stream and decoders.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing a resource fails.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Format-specific cursor state behind [`Entries`].
///
/// Implementations read the current entry's content through [`Read`] and
/// must fail reads with [`std::io::ErrorKind::InvalidInput`] while no entry
/// is open.
pub trait EntryCursor: Read {
    /// Advances to the next entry, discarding the previous entry's reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the next header cannot be decoded or describes an
    /// entry type that cannot be represented by [`Header`].
    fn next_entry(&mut self) -> Result<Option<Header>>;
}

/// Forward-only cursor over the entries of an [`Archive`].
///
/// `Entries` borrows its archive mutably, so the archive cannot be closed
/// while a cursor (or anything read from it) is alive.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::io::Read;
/// use unarc_core::{OpenOptions, open};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("archive.tar.gz")?;
/// let mut archive = open(file, &OpenOptions::new("tar.gz"))?;
///
/// let mut entries = archive.entries()?;
/// while let Some(header) = entries.next_entry()? {
///     let mut content = Vec::new();
///     entries.read_to_end(&mut content)?;
///     println!("{} ({} bytes)", header.name, content.len());
/// }
/// drop(entries);
///
/// archive.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Entries<'a> {
    cursor: Box<dyn EntryCursor + 'a>,
}

impl<'a> Entries<'a> {
    /// Wraps a format-specific cursor.
    pub fn new(cursor: impl EntryCursor + 'a) -> Self {
        Self {
            cursor: Box::new(cursor),
        }
    }

    /// Advances to the next entry.
    ///
    /// Returns `Ok(None)` at the end of the archive. The content of the
    /// previous entry is no longer readable afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be decoded or the entry type is
    /// not a regular file or directory.
    pub fn next_entry(&mut self) -> Result<Option<Header>> {
        self.cursor.next_entry()
    }
}

impl Read for Entries<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl fmt::Debug for Entries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entries").finish_non_exhaustive()
    }
}

/// Error returned by cursors when content is read with no open entry.
pub(crate) fn no_open_entry() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "no archive entry is open for reading",
    )
}
