//! Uniform reading and safe extraction of tar and zip archives.
//!
//! `unarc-core` opens an archive through a driver chosen by extension,
//! exposes its entries as normalized [`Header`]s with streaming content, and
//! writes them to disk while refusing any entry that would land outside of
//! the destination directory.
//!
//! Supported extensions:
//!
//! | Driver | Extensions |
//! |--------|------------|
//! | tar    | `tar`, `tgz`, `tar.gz`, `gz`, `txz`, `tar.xz`, `xz`, `tbz2`, `tbz`, `tar.bz2`, `bz2`, `tzst`, `tar.zst`, `zst` |
//! | zip    | `zip` |
//!
//! Tar archives are decoded as a stream. Zip archives are read fully into
//! memory first, since their index sits at the end of the file.
//!
//! # Examples
//!
//! Extract everything:
//!
//! ```no_run
//! use std::fs::File;
//! use unarc_core::{ExtractOptions, extract};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("archive.tar.gz")?;
//! let report = extract(file, "/output/dir", &ExtractOptions::new(".tar.gz"))?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```
//!
//! Read a single file:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::Read;
//! use unarc_core::{OpenOptions, by_name, open, pick};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut archive = open(File::open("archive.zip")?, &OpenOptions::new("zip"))?;
//! let mut entries = archive.entries()?;
//!
//! let mut manifest = String::new();
//! pick(&mut entries, by_name("manifest.json"))?.read_to_string(&mut manifest)?;
//! drop(entries);
//! archive.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod registry;
pub mod report;
pub mod security;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::extract;
pub use api::extract_file;
pub use api::open;
pub use config::ExtractOptions;
pub use config::OpenOptions;
pub use error::ArchiveError;
pub use error::Result;
pub use extraction::by_name;
pub use extraction::extract_archive;
pub use extraction::pick;
pub use formats::Archive;
pub use formats::Driver;
pub use formats::Entries;
pub use registry::Registry;
pub use report::ExtractionReport;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::Header;
pub use types::HeaderType;
pub use types::SafePath;
