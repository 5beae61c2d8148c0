//! Zip archive format handler.
//!
//! Zip keeps its central directory at the end of the file, so the whole input
//! is read into memory before the first entry can be listed. Memory use is
//! proportional to the archive size. Entry content is decompressed as it is
//! read, straight from that buffer.

use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::Take;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::SystemTime;

use flate2::CrcReader;
use flate2::read::DeflateDecoder;
use tracing::debug;
use tracing::trace;

use super::traits::Archive;
use super::traits::ArchiveReader;
use super::traits::Driver;
use super::traits::Entries;
use super::traits::EntryCursor;
use super::traits::no_open_entry;
use crate::ArchiveError;
use crate::Result;
use crate::types::Header;
use crate::types::HeaderType;

/// Extensions routed to the zip driver.
pub const ZIP_EXTENSIONS: &[&str] = &["zip"];

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Archive bytes shared between the index and the entry readers.
type ArchiveBytes = Cursor<Arc<[u8]>>;

/// Driver for zip archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDriver;

impl Driver for ZipDriver {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        ZIP_EXTENSIONS
    }

    fn open(&self, reader: ArchiveReader, extension: &str) -> Result<Box<dyn Archive>> {
        if !ZIP_EXTENSIONS.contains(&extension) {
            return Err(ArchiveError::UnsupportedExtension {
                extension: extension.to_string(),
            });
        }
        Ok(Box::new(ZipArchive::new(reader)?))
    }
}

/// An opened zip archive, held in memory.
///
/// The entry index and the current content reader live behind one mutex so
/// that advancing the cursor and replacing the reader happen as one step.
pub struct ZipArchive {
    state: Mutex<ZipState>,
    consumed: bool,
}

struct ZipState {
    data: Arc<[u8]>,
    archive: zip::ZipArchive<ArchiveBytes>,
    next_index: usize,
    current: Option<ContentReader>,
}

impl ZipArchive {
    /// Reads `reader` to the end and parses the central directory.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input fails or it is not a valid zip
    /// archive.
    pub fn new(mut reader: ArchiveReader) -> Result<Self> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|e| ArchiveError::invalid_archive("failed to read zip input", e))?;
        let data: Arc<[u8]> = buffer.into();

        let archive = zip::ZipArchive::new(Cursor::new(Arc::clone(&data))).map_err(|e| {
            ArchiveError::invalid_archive("failed to open zip archive", std::io::Error::from(e))
        })?;
        debug!(entries = archive.len(), bytes = data.len(), "opened zip archive");

        Ok(Self {
            state: Mutex::new(ZipState {
                data,
                archive,
                next_index: 0,
                current: None,
            }),
            consumed: false,
        })
    }

    /// Returns the number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Archive for ZipArchive {
    fn format_name(&self) -> &'static str {
        "zip"
    }

    fn entries(&mut self) -> Result<Entries<'_>> {
        if self.consumed {
            return Err(ArchiveError::EntriesConsumed);
        }
        self.consumed = true;
        Ok(Entries::new(ZipEntries { state: &self.state }))
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!("closed zip archive");
        drop(self);
        Ok(())
    }
}

fn lock(state: &Mutex<ZipState>) -> MutexGuard<'_, ZipState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ZipEntries<'a> {
    state: &'a Mutex<ZipState>,
}

impl EntryCursor for ZipEntries<'_> {
    fn next_entry(&mut self) -> Result<Option<Header>> {
        let mut guard = lock(self.state);
        let state = &mut *guard;
        state.current = None;

        if state.next_index >= state.archive.len() {
            return Ok(None);
        }
        let index = state.next_index;
        state.next_index += 1;

        let file = state.archive.by_index(index).map_err(|e| {
            ArchiveError::invalid_archive(
                format!("failed to read zip entry {index}"),
                std::io::Error::from(e),
            )
        })?;
        let header = convert_entry(&file)?;
        let content = ContentReader::open(&state.data, &file)?;
        drop(file);

        state.current = Some(content);
        Ok(Some(header))
    }
}

impl Read for ZipEntries<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match lock(self.state).current.as_mut() {
            Some(content) => content.read(buf),
            None => Err(no_open_entry()),
        }
    }
}

/// Compressed bytes of one entry, decoded by its storage method.
enum Body {
    Stored(Take<ArchiveBytes>),
    Deflated(Take<DeflateDecoder<Take<ArchiveBytes>>>),
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Stored(reader) => reader.read(buf),
            Self::Deflated(reader) => reader.read(buf),
        }
    }
}

/// Streaming reader over one entry, checked against the recorded CRC-32 once
/// the content is exhausted.
struct ContentReader {
    body: CrcReader<Body>,
    expected_crc: u32,
}

impl ContentReader {
    /// Positions a reader on the entry's data inside `data`.
    ///
    /// Output of a compressed entry is capped at its declared size.
    fn open<R: Read + Seek>(data: &Arc<[u8]>, file: &zip::read::ZipFile<'_, R>) -> Result<Self> {
        let mut raw = Cursor::new(Arc::clone(data));
        raw.set_position(file.data_start());
        let raw = raw.take(file.compressed_size());

        let body = match file.compression() {
            zip::CompressionMethod::Stored => Body::Stored(raw),
            zip::CompressionMethod::Deflated => {
                Body::Deflated(DeflateDecoder::new(raw).take(file.size()))
            }
            other => {
                return Err(ArchiveError::invalid_archive(
                    format!("unsupported compression method for {}", file.name()),
                    std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        format!("{other:?}"),
                    ),
                ));
            }
        };
        trace!(
            name = file.name(),
            offset = file.data_start(),
            compressed = file.compressed_size(),
            size = file.size(),
            "opened zip entry stream"
        );

        Ok(Self {
            body: CrcReader::new(body),
            expected_crc: file.crc32(),
        })
    }
}

impl Read for ContentReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.body.read(buf)?;
        if n == 0 && !buf.is_empty() && self.body.crc().sum() != self.expected_crc {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "zip entry checksum mismatch",
            ));
        }
        Ok(n)
    }
}

fn convert_entry<R: Read + Seek>(file: &zip::read::ZipFile<'_, R>) -> Result<Header> {
    let name = file.name().to_string();

    if let Some(mode) = file.unix_mode()
        && mode & S_IFMT == S_IFLNK
    {
        return Err(ArchiveError::UnsupportedEntryType {
            name,
            type_tag: "symlink".to_string(),
        });
    }

    let entry_type = if file.is_dir() {
        HeaderType::Directory
    } else {
        HeaderType::File
    };

    let mut header = Header::new(name, entry_type);
    if let Some(mode) = file.unix_mode() {
        header.mode = mode & Header::MODE_MASK;
    }
    if entry_type.is_file() {
        header.size = file.size();
    }

    #[allow(deprecated)]
    let mod_time = file.last_modified().and_then(|dt| {
        dt.to_time().ok().and_then(|t| {
            let timestamp = u64::try_from(t.unix_timestamp()).ok()?;
            SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(timestamp))
        })
    });
    header.mod_time = mod_time;

    Ok(header)
}
