//! Test utilities for building in-memory archives.
//!
//! This module provides reusable helpers for creating test archives,
//! reducing code duplication across unit tests, integration tests and
//! benches.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use crate::formats::CompressionCodec;

/// Owner and group ids written into tar headers.
pub const TEST_UID: u64 = 1000;

/// Modification time written into tar headers unless overridden.
pub const TEST_MTIME: u64 = 1_700_000_000;

/// Compresses `data` with `codec`. [`CompressionCodec::None`] returns the
/// input unchanged.
///
/// # Examples
///
/// ```
/// use unarc_core::formats::CompressionCodec;
/// use unarc_core::test_utils::compress;
///
/// let gz = compress(b"hello", CompressionCodec::Gzip);
/// assert_eq!(&gz[..2], &[0x1f, 0x8b]);
/// ```
#[must_use]
pub fn compress(data: &[u8], codec: CompressionCodec) -> Vec<u8> {
    match codec {
        CompressionCodec::None => data.to_vec(),
        CompressionCodec::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        CompressionCodec::Bzip2 => {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        CompressionCodec::Xz => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        CompressionCodec::Zstd => zstd::encode_all(data, 3).unwrap(),
    }
}

/// Builds an archive holding a single `file.txt` with content `hello world`,
/// encoded for `extension` (leading `.` optional).
///
/// # Examples
///
/// ```
/// use unarc_core::test_utils::hello_world_archive;
///
/// let data = hello_world_archive(".tar.gz");
/// assert!(!data.is_empty());
/// ```
#[must_use]
pub fn hello_world_archive(extension: &str) -> Vec<u8> {
    let extension = crate::registry::normalize_extension(extension);
    if extension == "zip" {
        return ZipTestBuilder::new()
            .add_file("file.txt", b"hello world")
            .build();
    }

    let codec = CompressionCodec::from_extension(extension).unwrap();
    let tar = TarTestBuilder::new()
        .add_file("file.txt", b"hello world")
        .build();
    compress(&tar, codec)
}

/// Builder for creating TAR test archives with various entry types.
///
/// Headers use the GNU format with uid and gid [`TEST_UID`] and mtime
/// [`TEST_MTIME`].
///
/// # Examples
///
/// ```
/// use unarc_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_symlink("link", "file.txt")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    fn header(entry_type: tar::EntryType, size: u64, mode: u32) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(mode);
        header.set_uid(TEST_UID);
        header.set_gid(TEST_UID);
        header.set_mtime(TEST_MTIME);
        header
    }

    /// Adds a regular file to the archive.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, mode);
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file with a custom mtime and, optionally, a GNU atime.
    #[must_use]
    pub fn add_file_with_times(
        mut self,
        path: &str,
        data: &[u8],
        mtime: u64,
        atime: Option<u64>,
    ) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, 0o644);
        header.set_mtime(mtime);
        if let Some(atime) = atime {
            header.as_gnu_mut().unwrap().set_atime(atime);
        }
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file owned by `uid` and `gid`.
    #[must_use]
    pub fn add_file_with_owner(mut self, path: &str, data: &[u8], uid: u64, gid: u64) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, 0o644);
        header.set_uid(uid);
        header.set_gid(gid);
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file preceded by a PAX extended header carrying
    /// `records` as `key=value` pairs.
    #[must_use]
    pub fn add_file_with_pax(mut self, path: &str, data: &[u8], records: &[(&str, &str)]) -> Self {
        let mut body = Vec::new();
        for (key, value) in records {
            // The record length counts its own digits.
            let rest = format!(" {key}={value}\n");
            let mut len = rest.len() + 1;
            while len.to_string().len() + rest.len() != len {
                len += 1;
            }
            body.extend_from_slice(format!("{len}{rest}").as_bytes());
        }

        let mut pax = Self::header(tar::EntryType::XHeader, body.len() as u64, 0o644);
        self.builder
            .append_data(&mut pax, "PaxHeaders/entry", body.as_slice())
            .unwrap();
        self.add_file(path, data)
    }

    /// Adds a regular file whose name is written verbatim into the header.
    ///
    /// Unlike [`add_file`](Self::add_file) this accepts names the tar crate
    /// refuses to write, such as `../escape.txt` or `/etc/passwd`. The name
    /// must fit the 100-byte name field.
    #[must_use]
    pub fn add_raw_file(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, 0o644);
        let bytes = name.as_bytes();
        header.as_old_mut().name[..bytes.len()].copy_from_slice(bytes);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Adds a directory to the archive.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mode(path, 0o755)
    }

    /// Adds a directory with custom mode.
    #[must_use]
    pub fn add_directory_with_mode(mut self, path: &str, mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Directory, 0, mode);
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Symlink, 0, 0o777);
        header.set_link_name(target).unwrap();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a hardlink to the archive.
    #[must_use]
    pub fn add_hardlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Link, 0, 0o644);
        header.set_link_name(target).unwrap();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a named pipe to the archive.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Fifo, 0, 0o644);
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Builds and returns the TAR archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating ZIP test archives with various entry types.
///
/// # Examples
///
/// ```
/// use unarc_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a stored (uncompressed) file to the archive.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a stored file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(mode);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a deflate-compressed file to the archive.
    #[must_use]
    pub fn add_deflated_file(mut self, path: &str, data: &[u8]) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory to the archive.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[cfg(unix)]
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        use zip::write::SimpleFileOptions;

        // Stored with the S_IFLNK mode bits and the target as content
        self.zip
            .add_symlink(path, target, SimpleFileOptions::default())
            .unwrap();
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tar_builder() {
        let tar_data = TarTestBuilder::new()
            .add_file("file.txt", b"content")
            .add_directory("dir/")
            .build();
        assert!(!tar_data.is_empty());
        assert_eq!(tar_data.len() % 512, 0);
    }

    #[test]
    fn test_zip_builder() {
        let zip_data = ZipTestBuilder::new()
            .add_file("file.txt", b"content")
            .add_directory("dir/")
            .build();
        assert_eq!(&zip_data[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_hello_world_for_every_extension() {
        for ext in crate::Registry::global().supported_extensions() {
            assert!(!hello_world_archive(ext).is_empty(), "{ext}");
        }
    }

    #[test]
    fn test_compress_none_is_identity() {
        assert_eq!(compress(b"abc", CompressionCodec::None), b"abc");
    }
}
