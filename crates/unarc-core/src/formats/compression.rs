//! Compression filters for tar-family archives.
//!
//! A tar stream may be wrapped by exactly one compressor. The extension the
//! caller asked for decides which decoder sits between the raw input and the
//! tar reader.
//!
//! # Supported Codecs
//!
//! - **Gzip** (.tar.gz, .tgz, .gz)
//! - **Bzip2** (.tar.bz2, .tbz2, .tbz, .bz2)
//! - **Xz** (.tar.xz, .txz, .xz)
//! - **Zstd** (.tar.zst, .tzst, .zst)

use std::io::Read;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::ArchiveError;
use crate::Result;

/// Compression filter applied to a tar stream.
///
/// # Examples
///
/// ```
/// use unarc_core::formats::compression::CompressionCodec;
///
/// assert_eq!(CompressionCodec::from_extension("tgz"), Some(CompressionCodec::Gzip));
/// assert_eq!(CompressionCodec::from_extension("tar"), Some(CompressionCodec::None));
/// assert_eq!(CompressionCodec::from_extension("zip"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    /// Plain tar, bytes pass through unchanged.
    None,

    /// Gzip compression (deflate algorithm).
    Gzip,

    /// Bzip2 compression (Burrows-Wheeler algorithm).
    Bzip2,

    /// Xz compression (LZMA2 algorithm).
    Xz,

    /// Zstd compression (Zstandard algorithm).
    Zstd,
}

impl CompressionCodec {
    /// Maps a normalized tar-family extension to its codec.
    ///
    /// Bare compressor extensions (`gz`, `bz2`, `xz`, `zst`) mean a tar
    /// stream wrapped directly by that compressor.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "tar" => Some(Self::None),
            "tgz" | "tar.gz" | "gz" => Some(Self::Gzip),
            "tbz2" | "tbz" | "tar.bz2" | "bz2" => Some(Self::Bzip2),
            "txz" | "tar.xz" | "xz" => Some(Self::Xz),
            "tzst" | "tar.zst" | "zst" => Some(Self::Zstd),
            _ => None,
        }
    }

    /// Returns the canonical tar extension for this codec.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarc_core::formats::compression::CompressionCodec;
    ///
    /// assert_eq!(CompressionCodec::None.extension(), "tar");
    /// assert_eq!(CompressionCodec::Gzip.extension(), "tar.gz");
    /// assert_eq!(CompressionCodec::Zstd.extension(), "tar.zst");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
            Self::Xz => "tar.xz",
            Self::Zstd => "tar.zst",
        }
    }

    /// Returns a human-readable name for this codec.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Wraps `reader` in the decoder for this codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be initialized (zstd allocates
    /// its context eagerly).
    pub fn decoder<R: Read>(self, reader: R) -> Result<Decoder<R>> {
        match self {
            Self::None => Ok(Decoder::Passthrough(reader)),
            Self::Gzip => Ok(Decoder::Gzip(Box::new(GzDecoder::new(reader)))),
            Self::Bzip2 => Ok(Decoder::Bzip2(Box::new(BzDecoder::new(reader)))),
            Self::Xz => Ok(Decoder::Xz(Box::new(XzDecoder::new(reader)))),
            Self::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(reader).map_err(|e| {
                    ArchiveError::invalid_archive("failed to create zstd reader", e)
                })?;
                Ok(Decoder::Zstd(Box::new(decoder)))
            }
        }
    }
}

/// Decoder sitting between the raw input and the tar reader.
pub enum Decoder<R: Read> {
    /// Uncompressed tar.
    Passthrough(R),
    /// Gzip stream.
    Gzip(Box<GzDecoder<R>>),
    /// Bzip2 stream.
    Bzip2(Box<BzDecoder<R>>),
    /// Xz stream.
    Xz(Box<XzDecoder<R>>),
    /// Zstd stream.
    Zstd(Box<zstd::stream::read::Decoder<'static, std::io::BufReader<R>>>),
}

impl<R: Read> Decoder<R> {
    /// Returns the codec this decoder implements.
    #[must_use]
    pub const fn codec(&self) -> CompressionCodec {
        match self {
            Self::Passthrough(_) => CompressionCodec::None,
            Self::Gzip(_) => CompressionCodec::Gzip,
            Self::Bzip2(_) => CompressionCodec::Bzip2,
            Self::Xz(_) => CompressionCodec::Xz,
            Self::Zstd(_) => CompressionCodec::Zstd,
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Bzip2(d) => d.read(buf),
            Self::Xz(d) => d.read(buf),
            Self::Zstd(d) => d.read(buf),
        }
    }
}
