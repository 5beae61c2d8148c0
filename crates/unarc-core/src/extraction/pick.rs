//! Selecting a single file from an archive.

use tracing::debug;
use tracing::trace;

use crate::ArchiveError;
use crate::Result;
use crate::formats::Entries;
use crate::types::Header;

/// Advances `entries` to the first file whose header satisfies `predicate`.
///
/// Directories are skipped without consulting the predicate. On success the
/// returned cursor is positioned on the matching file, so reading from it
/// yields that file's content. Close the archive once the content has been
/// read.
///
/// # Errors
///
/// Returns [`ArchiveError::NotFound`] if no file matches before the end of
/// the archive, or any error raised while decoding headers.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::io::Read;
/// use unarc_core::{OpenOptions, by_name, open, pick};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = open(File::open("release.tar.gz")?, &OpenOptions::new(".tar.gz"))?;
/// let mut entries = archive.entries()?;
///
/// let mut content = String::new();
/// pick(&mut entries, by_name("bin/VERSION"))?.read_to_string(&mut content)?;
/// drop(entries);
///
/// archive.close()?;
/// # Ok(())
/// # }
/// ```
pub fn pick<'e, 'a, F>(entries: &'e mut Entries<'a>, mut predicate: F) -> Result<&'e mut Entries<'a>>
where
    F: FnMut(&Header) -> bool,
{
    while let Some(header) = entries.next_entry()? {
        if !header.is_file() {
            trace!(name = %header.name, "skipping directory while picking");
            continue;
        }

        if predicate(&header) {
            debug!(name = %header.name, size = header.size, "picked entry");
            return Ok(entries);
        }
        trace!(name = %header.name, "entry does not match");
    }

    Err(ArchiveError::NotFound)
}

/// Returns a predicate matching headers whose name equals `name` exactly.
///
/// # Examples
///
/// ```
/// use unarc_core::by_name;
/// use unarc_core::types::{Header, HeaderType};
///
/// let matches = by_name("file.txt");
/// assert!(matches(&Header::new("file.txt", HeaderType::File)));
/// assert!(!matches(&Header::new("./file.txt", HeaderType::File)));
/// ```
pub fn by_name(name: impl Into<String>) -> impl Fn(&Header) -> bool {
    let name = name.into();
    move |header| header.name == name
}
