//! High-level public API for opening and extracting archives.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::ArchiveError;
use crate::ExtractOptions;
use crate::ExtractionReport;
use crate::OpenOptions;
use crate::Registry;
use crate::Result;
use crate::extraction::extract_archive;
use crate::formats::Archive;

/// Opens an archive read from `reader` with the driver registered for
/// `options.extension`.
///
/// The returned archive owns `reader`. Call [`Archive::close`] when done, or
/// drop it.
///
/// # Errors
///
/// Returns an error if:
/// - The extension is empty ([`ArchiveError::MissingExtension`])
/// - No driver handles it ([`ArchiveError::UnsupportedExtension`])
/// - The driver cannot decode the container
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use unarc_core::{OpenOptions, open};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = open(File::open("archive.tar.xz")?, &OpenOptions::new(".tar.xz"))?;
/// assert_eq!(archive.format_name(), "tar");
/// archive.close()?;
/// # Ok(())
/// # }
/// ```
pub fn open<R: Read + Send + 'static>(reader: R, options: &OpenOptions) -> Result<Box<dyn Archive>> {
    Registry::global().open(reader, &options.extension)
}

/// Extracts every entry of the archive read from `reader` into `dest`.
///
/// Opens the archive, extracts it and closes it. When extraction fails the
/// archive is still released, and the extraction error is returned.
///
/// # Errors
///
/// Returns any error from [`open`] or
/// [`extract_archive`](crate::extract_archive), or a failure to close the
/// archive.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use unarc_core::{ExtractOptions, extract};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("archive.tgz")?;
/// let report = extract(file, "/tmp/output", &ExtractOptions::new(".tgz"))?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract<R: Read + Send + 'static>(
    reader: R,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let mut archive = open(reader, &options.open_options())?;
    let report = extract_archive(archive.as_mut(), dest, options)?;
    archive.close()?;
    Ok(report)
}

/// Extracts the archive file at `archive_path` into `dest`.
///
/// When `options.extension` is empty the extension is derived from the file
/// name with [`Registry::extension_of`].
///
/// # Errors
///
/// Returns [`ArchiveError::MissingExtension`] if no extension is given and
/// the file name has none, [`ArchiveError::Filesystem`] if the file cannot be
/// opened, or any error from [`extract`].
///
/// # Examples
///
/// ```no_run
/// use unarc_core::{ExtractOptions, extract_file};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_file("release.tar.gz", "/tmp/output", &ExtractOptions::default())?;
/// println!("Wrote {} bytes", report.bytes_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_file(
    archive_path: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let archive_path = archive_path.as_ref();

    let mut options = options.clone();
    if options.extension.is_empty() {
        options.extension = Registry::global()
            .extension_of(archive_path)
            .ok_or(ArchiveError::MissingExtension)?;
        debug!(
            path = %archive_path.display(),
            extension = %options.extension,
            "derived archive extension"
        );
    }

    let file = File::open(archive_path)
        .map_err(|e| ArchiveError::filesystem("open", archive_path, e))?;
    extract(BufReader::new(file), dest, &options)
}
