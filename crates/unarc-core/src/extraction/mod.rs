//! Materializing archive entries on the filesystem.
//!
//! - [`engine`]: drains an archive into a destination directory
//! - [`pick`]: positions a cursor on a single matching file
//! - [`attributes`]: permission, ownership and timestamp restoration

pub(crate) mod attributes;
pub mod engine;
pub mod pick;

pub use engine::extract_archive;
pub use pick::by_name;
pub use pick::pick;
