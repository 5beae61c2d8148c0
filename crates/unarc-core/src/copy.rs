//! File copy with a reusable buffer.
//!
//! Entry content is copied in fixed-size chunks through a buffer that lives
//! for the whole extraction, so materializing many small files does not
//! allocate per file.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// Buffer size for I/O operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer for copying entry content.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use unarc_core::copy::{CopyBuffer, copy_exact};
///
/// let mut buffer = CopyBuffer::new();
/// let mut input = Cursor::new(b"hello world".to_vec());
/// let mut output = Vec::new();
///
/// let copied = copy_exact(&mut input, &mut output, 5, &mut buffer).unwrap();
/// assert_eq!(copied, 5);
/// assert_eq!(output, b"hello");
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zero-initialized copy buffer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of a copy failed.
#[derive(Debug)]
pub enum CopyError {
    /// Reading from the source failed.
    Read(io::Error),
    /// Writing to the destination failed.
    Write(io::Error),
}

/// Copies at most `limit` bytes from `reader` to `writer`.
///
/// Returns the number of bytes copied. A result smaller than `limit` means
/// the reader reached its end early; the caller decides whether that is an
/// error.
///
/// # Errors
///
/// Returns [`CopyError::Read`] or [`CopyError::Write`] depending on which
/// side failed. Interrupted reads are retried.
#[inline]
pub fn copy_exact<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    limit: u64,
    buffer: &mut CopyBuffer,
) -> Result<u64, CopyError> {
    let mut total: u64 = 0;

    while total < limit {
        let remaining = usize::try_from(limit - total).unwrap_or(usize::MAX);
        let chunk = remaining.min(buffer.buf.len());

        let bytes_read = match reader.read(&mut buffer.buf[..chunk]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyError::Write)?;

        total += bytes_read as u64;
    }

    Ok(total)
}
