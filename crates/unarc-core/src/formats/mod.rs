//! Archive format implementations.

pub mod compression;
pub mod tar;
pub mod traits;
pub mod zip;

// Re-export main types for convenience
pub use compression::CompressionCodec;
pub use tar::TarArchive;
pub use tar::TarDriver;
pub use traits::Archive;
pub use traits::ArchiveReader;
pub use traits::Driver;
pub use traits::Entries;
pub use traits::EntryCursor;
pub use zip::ZipArchive;
pub use zip::ZipDriver;
