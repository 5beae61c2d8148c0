//! Core extraction engine.

use std::fs::DirBuilder;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use super::attributes::restore_attributes;
use crate::ArchiveError;
use crate::ExtractOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_exact;
use crate::formats::Archive;
use crate::formats::Entries;
use crate::security::validate_path;
use crate::types::DestDir;
use crate::types::Header;
use crate::types::HeaderType;

/// Mode for parent directories that have no entry of their own.
const IMPLIED_DIR_MODE: u32 = 0o755;

/// Writes every entry of `archive` below `dest`.
///
/// Entries are processed in archive order. Each entry name is resolved
/// against `dest` first; a name that escapes it aborts the whole extraction
/// with [`ArchiveError::TaintedPath`] before anything is written for that
/// entry. Entries already extracted stay on disk.
///
/// The archive is not closed.
///
/// # Errors
///
/// Returns an error if:
/// - The archive entries were already consumed
/// - An entry cannot be decoded or has an unsupported type
/// - An entry path escapes the destination
/// - A file's content ends before its declared size
/// - Any filesystem operation fails
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use unarc_core::{ExtractOptions, OpenOptions, extract_archive, open};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = open(File::open("bundle.zip")?, &OpenOptions::new("zip"))?;
/// let report = extract_archive(archive.as_mut(), "/tmp/out", &ExtractOptions::new("zip"))?;
/// archive.close()?;
///
/// println!("{} files, {} bytes", report.files_extracted, report.bytes_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive(
    archive: &mut dyn Archive,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let dest = DestDir::new(dest.as_ref())?;
    let format_name = archive.format_name();
    let mut entries = archive.entries()?;

    let mut report = ExtractionReport::new();
    let mut buffer = CopyBuffer::new();

    while let Some(header) = entries.next_entry()? {
        let path = validate_path(&header.name, header.entry_type, &dest)?;
        let path = path.as_path();

        match header.entry_type {
            HeaderType::Directory => {
                create_directory(path, header.mode)?;
                report.directories_created += 1;
            }
            HeaderType::File => {
                let written = write_file(&mut entries, &header, path, &mut buffer)?;
                report.files_extracted += 1;
                report.bytes_written += written;
            }
        }

        restore_attributes(path, &header, options, &mut report)?;
        debug!(
            name = %header.name,
            kind = %header.entry_type,
            size = header.size,
            "extracted entry"
        );
    }

    report.duration = start.elapsed();
    debug!(
        format = format_name,
        dest = %dest.as_path().display(),
        files = report.files_extracted,
        directories = report.directories_created,
        bytes = report.bytes_written,
        "extraction complete"
    );
    Ok(report)
}

/// Creates `path` and any missing parents. Existing directories are kept.
fn create_directory(path: &Path, mode: u32) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder
        .create(path)
        .map_err(|e| ArchiveError::filesystem("create directory", path, e))
}

/// Writes the current entry's content to `path` and returns the byte count.
///
/// The destination handle is released before returning on every path. When
/// the copy already failed, that error is reported and a failure to sync
/// the handle is not.
fn write_file(
    entries: &mut Entries<'_>,
    header: &Header,
    path: &Path,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    // Archives often omit entries for intermediate directories.
    if let Some(parent) = path.parent() {
        create_directory(parent, IMPLIED_DIR_MODE)?;
    }

    let file = File::create(path).map_err(|e| ArchiveError::filesystem("create", path, e))?;
    let mut writer = BufWriter::with_capacity(buffer.size(), file);

    let copied = match copy_exact(entries, &mut writer, header.size, buffer) {
        Ok(copied) => copied,
        Err(CopyError::Read(e)) => {
            return Err(ArchiveError::invalid_archive(
                format!("failed to read content of {}", header.name),
                e,
            ));
        }
        Err(CopyError::Write(e)) => return Err(ArchiveError::filesystem("write", path, e)),
    };

    if copied < header.size {
        return Err(ArchiveError::TruncatedEntry {
            name: header.name.clone(),
            expected: header.size,
            actual: copied,
        });
    }

    let file = writer
        .into_inner()
        .map_err(|e| ArchiveError::filesystem("flush", path, e.into_error()))?;
    finish_file(file, path)?;

    Ok(copied)
}

/// Syncs `file` and releases it. Write errors the kernel deferred surface
/// here as a `close` failure.
fn finish_file(file: File, path: &Path) -> Result<()> {
    file.sync_data()
        .map_err(|e| ArchiveError::filesystem("close", path, e))
}
