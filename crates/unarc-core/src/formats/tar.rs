//! Tar archive format handler.
//!
//! Covers plain tar and tar streams wrapped by one compressor. Entries are
//! decoded on demand and their content is read straight from the decoder,
//! so memory use does not depend on the archive size.

use std::io::Read;
use std::time::Duration;
use std::time::SystemTime;

use tracing::debug;

use super::compression::CompressionCodec;
use super::compression::Decoder;
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

/// Extensions routed to the tar driver.
pub const TAR_EXTENSIONS: &[&str] = &[
    "tar", "tgz", "tar.gz", "gz", "txz", "tar.xz", "xz", "tbz2", "tbz", "tar.bz2", "bz2", "tzst",
    "tar.zst", "zst",
];

type TarStream = Decoder<ArchiveReader>;

/// Driver for tar and compressed tar archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarDriver;

impl Driver for TarDriver {
    fn name(&self) -> &'static str {
        "tar"
    }

    fn extensions(&self) -> &'static [&'static str] {
        TAR_EXTENSIONS
    }

    fn open(&self, reader: ArchiveReader, extension: &str) -> Result<Box<dyn Archive>> {
        let codec = CompressionCodec::from_extension(extension).ok_or_else(|| {
            ArchiveError::UnsupportedExtension {
                extension: extension.to_string(),
            }
        })?;
        Ok(Box::new(TarArchive::new(reader, codec)?))
    }
}

/// An opened tar archive.
pub struct TarArchive {
    inner: tar::Archive<TarStream>,
    codec: CompressionCodec,
    consumed: bool,
}

impl TarArchive {
    /// Stacks the decoder for `codec` on `reader` and wraps it in a tar
    /// reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be initialized.
    pub fn new(reader: ArchiveReader, codec: CompressionCodec) -> Result<Self> {
        let decoder = codec.decoder(reader)?;
        debug!(codec = codec.name(), "opened tar archive");
        Ok(Self {
            inner: tar::Archive::new(decoder),
            codec,
            consumed: false,
        })
    }

    /// Returns the compression codec in front of the tar stream.
    #[must_use]
    pub const fn codec(&self) -> CompressionCodec {
        self.codec
    }
}

impl Archive for TarArchive {
    fn format_name(&self) -> &'static str {
        "tar"
    }

    fn entries(&mut self) -> Result<Entries<'_>> {
        if self.consumed {
            return Err(ArchiveError::EntriesConsumed);
        }
        self.consumed = true;

        let entries = self
            .inner
            .entries()
            .map_err(|e| ArchiveError::invalid_archive("failed to read tar entries", e))?;
        Ok(Entries::new(TarEntries {
            entries,
            current: None,
        }))
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!(codec = self.codec.name(), "closed tar archive");
        drop(self);
        Ok(())
    }
}

struct TarEntries<'a> {
    entries: tar::Entries<'a, TarStream>,
    current: Option<tar::Entry<'a, TarStream>>,
}

impl EntryCursor for TarEntries<'_> {
    fn next_entry(&mut self) -> Result<Option<Header>> {
        self.current = None;

        loop {
            let Some(entry) = self.entries.next() else {
                return Ok(None);
            };
            let mut entry = entry
                .map_err(|e| ArchiveError::invalid_archive("failed to read tar entry", e))?;

            // Global PAX records only carry defaults for later entries.
            if entry.header().entry_type() == tar::EntryType::XGlobalHeader {
                continue;
            }

            let header = convert_entry(&mut entry)?;
            self.current = Some(entry);
            return Ok(Some(header));
        }
    }
}

impl Read for TarEntries<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.current.as_mut() {
            Some(entry) => entry.read(buf),
            None => Err(no_open_entry()),
        }
    }
}

fn convert_entry<R: Read>(entry: &mut tar::Entry<'_, R>) -> Result<Header> {
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

    let entry_type = match entry.header().entry_type() {
        tar::EntryType::Regular | tar::EntryType::Continuous => HeaderType::File,
        tar::EntryType::Directory => HeaderType::Directory,
        other => {
            return Err(ArchiveError::UnsupportedEntryType {
                name,
                type_tag: type_tag(other),
            });
        }
    };

    let header = entry.header();
    let mode = header.mode().map_err(|e| {
        ArchiveError::invalid_archive(format!("invalid mode in tar header of {name}"), e)
    })? & Header::MODE_MASK;
    let mut uid = header.uid().ok().and_then(|id| u32::try_from(id).ok());
    let mut gid = header.gid().ok().and_then(|id| u32::try_from(id).ok());
    let mut mod_time = header.mtime().ok().and_then(from_unix_seconds);
    let mut access_time = header
        .as_gnu()
        .and_then(|gnu| gnu.atime().ok())
        .filter(|&secs| secs != 0)
        .and_then(from_unix_seconds);

    let size = match entry_type {
        HeaderType::File => entry.size(),
        HeaderType::Directory => 0,
    };

    if let Ok(Some(extensions)) = entry.pax_extensions() {
        for extension in extensions.flatten() {
            match (extension.key(), extension.value()) {
                (Ok("atime"), Ok(value)) => access_time = parse_pax_time(value).or(access_time),
                (Ok("mtime"), Ok(value)) => mod_time = parse_pax_time(value).or(mod_time),
                (Ok("uid"), Ok(value)) => uid = value.parse().ok().or(uid),
                (Ok("gid"), Ok(value)) => gid = value.parse().ok().or(gid),
                _ => {}
            }
        }
    }

    Ok(Header {
        name,
        entry_type,
        size,
        mode,
        access_time,
        mod_time,
        uid,
        gid,
    })
}

fn type_tag(entry_type: tar::EntryType) -> String {
    match entry_type {
        tar::EntryType::Symlink => "symlink".to_string(),
        tar::EntryType::Link => "hardlink".to_string(),
        tar::EntryType::Char => "character device".to_string(),
        tar::EntryType::Block => "block device".to_string(),
        tar::EntryType::Fifo => "fifo".to_string(),
        tar::EntryType::GNUSparse => "sparse file".to_string(),
        other => format!("type flag {:?}", char::from(other.as_byte())),
    }
}

fn from_unix_seconds(secs: u64) -> Option<SystemTime> {
    SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(secs))
}

/// Parses a PAX time record (`seconds[.fraction]`). Times before the epoch
/// are ignored.
fn parse_pax_time(value: &str) -> Option<SystemTime> {
    let (secs, fraction) = value.split_once('.').unwrap_or((value, ""));
    let secs: u64 = secs.parse().ok()?;

    let digits: String = fraction.chars().take(9).collect();
    let nanos = if digits.is_empty() {
        0
    } else {
        let scale = 10u32.pow(9 - u32::try_from(digits.len()).ok()?);
        digits.parse::<u32>().ok()? * scale
    };

    SystemTime::UNIX_EPOCH.checked_add(Duration::new(secs, nanos))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::compress;
    use std::io::Cursor;

    fn open_tar(data: Vec<u8>, extension: &str) -> Box<dyn Archive> {
        TarDriver
            .open(Box::new(Cursor::new(data)), extension)
            .expect("tar should open")
    }

    #[test]
    fn test_driver_extensions_have_codecs() {
        for ext in TarDriver.extensions() {
            assert!(
                CompressionCodec::from_extension(ext).is_some(),
                "{ext} has no codec"
            );
        }
    }

    #[test]
    fn test_driver_rejects_unmapped_extension() {
        let result = TarDriver.open(Box::new(Cursor::new(Vec::new())), "rar");
        assert!(matches!(
            result,
            Err(ArchiveError::UnsupportedExtension { extension }) if extension == "rar"
        ));
    }

    #[test]
    fn test_reads_headers_and_content() {
        let data = TarTestBuilder::new()
            .add_directory("dir/")
            .add_file_with_mode("dir/file.txt", b"hello world", 0o640)
            .build();

        let mut archive = open_tar(data, "tar");
        assert_eq!(archive.format_name(), "tar");
        let mut entries = archive.entries().unwrap();

        let dir = entries.next_entry().unwrap().unwrap();
        assert_eq!(dir.name, "dir/");
        assert!(dir.is_directory());
        assert_eq!(dir.size, 0);

        let file = entries.next_entry().unwrap().unwrap();
        assert_eq!(file.name, "dir/file.txt");
        assert!(file.is_file());
        assert_eq!(file.size, 11);
        assert_eq!(file.mode, 0o640);
        assert_eq!(file.ownership(), Some((1000, 1000)));

        let mut content = String::new();
        entries.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello world");

        assert!(entries.next_entry().unwrap().is_none());
        assert!(entries.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_skips_unread_content() {
        let data = TarTestBuilder::new()
            .add_file("a.txt", b"first entry")
            .add_file("b.txt", b"second")
            .build();

        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();
        entries.next_entry().unwrap().unwrap();

        let second = entries.next_entry().unwrap().unwrap();
        assert_eq!(second.name, "b.txt");
        let mut content = String::new();
        entries.read_to_string(&mut content).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn test_read_without_entry_is_invalid_input() {
        let data = TarTestBuilder::new().add_file("a.txt", b"a").build();
        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();

        let mut buf = [0u8; 8];
        let err = entries.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_entries_twice_fails() {
        let data = TarTestBuilder::new().add_file("a.txt", b"a").build();
        let mut archive = open_tar(data, "tar");

        drop(archive.entries().unwrap());
        assert!(matches!(
            archive.entries(),
            Err(ArchiveError::EntriesConsumed)
        ));
        archive.close().unwrap();
    }

    #[test]
    fn test_mtime_and_gnu_atime() {
        let data = TarTestBuilder::new()
            .add_file_with_times("a.txt", b"a", 1_600_000_000, Some(1_650_000_000))
            .build();

        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();
        let header = entries.next_entry().unwrap().unwrap();

        assert_eq!(header.mod_time, from_unix_seconds(1_600_000_000));
        assert_eq!(header.access_time, from_unix_seconds(1_650_000_000));
    }

    #[test]
    fn test_pax_records_override_header() {
        let data = TarTestBuilder::new()
            .add_file_with_pax(
                "big-ids.txt",
                b"x",
                &[
                    ("uid", "3000000"),
                    ("gid", "3000001"),
                    ("mtime", "1650000000.25"),
                ],
            )
            .build();

        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();
        let header = entries.next_entry().unwrap().unwrap();

        assert_eq!(header.name, "big-ids.txt");
        assert_eq!(header.ownership(), Some((3_000_000, 3_000_001)));
        assert_eq!(
            header.mod_time,
            Some(SystemTime::UNIX_EPOCH + Duration::new(1_650_000_000, 250_000_000))
        );
        assert!(entries.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_unparsable_pax_ownership_keeps_header_value() {
        let data = TarTestBuilder::new()
            .add_file_with_pax("a.txt", b"a", &[("uid", "not-a-number")])
            .build();

        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();
        let header = entries.next_entry().unwrap().unwrap();

        let test_id = u32::try_from(crate::test_utils::TEST_UID).unwrap();
        assert_eq!(header.ownership(), Some((test_id, test_id)));
    }

    #[test]
    fn test_zero_gnu_atime_is_absent() {
        let data = TarTestBuilder::new().add_file("a.txt", b"a").build();
        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();
        let header = entries.next_entry().unwrap().unwrap();
        assert!(header.access_time.is_none());
        assert!(header.mod_time.is_some());
    }

    #[test]
    fn test_symlink_rejected_with_name() {
        let data = TarTestBuilder::new()
            .add_symlink("link", "target.txt")
            .build();
        let mut archive = open_tar(data, "tar");
        let mut entries = archive.entries().unwrap();

        let err = entries.next_entry().unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::UnsupportedEntryType { ref name, ref type_tag }
                if name == "link" && type_tag == "symlink"
        ));
    }

    #[test]
    fn test_compressed_variants() {
        let tar = TarTestBuilder::new().add_file("file.txt", b"hello world").build();

        for ext in ["tgz", "tar.bz2", "txz", "tar.zst", "gz", "zst"] {
            let codec = CompressionCodec::from_extension(ext).unwrap();
            let mut archive = open_tar(compress(&tar, codec), ext);
            let mut entries = archive.entries().unwrap();

            let header = entries.next_entry().unwrap().unwrap();
            assert_eq!(header.name, "file.txt", "extension {ext}");
            let mut content = String::new();
            entries.read_to_string(&mut content).unwrap();
            assert_eq!(content, "hello world", "extension {ext}");
        }
    }

    #[test]
    fn test_compressed_non_tar_fails() {
        let raw = compress(b"this is not a tar stream at all", CompressionCodec::Gzip);
        let mut archive = open_tar(raw, "gz");
        let mut entries = archive.entries().unwrap();
        assert!(entries.next_entry().is_err());
    }

    #[test]
    fn test_parse_pax_time() {
        assert_eq!(parse_pax_time("100"), from_unix_seconds(100));
        assert_eq!(
            parse_pax_time("100.5"),
            SystemTime::UNIX_EPOCH.checked_add(Duration::new(100, 500_000_000))
        );
        assert_eq!(parse_pax_time("-1"), None);
        assert_eq!(parse_pax_time("abc"), None);
    }
}
