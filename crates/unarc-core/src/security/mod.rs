//! Path sanitization for archive extraction.
//!
//! Entry names are untrusted. Every name is resolved against the destination
//! directory before anything touches the filesystem, and a name that escapes
//! it aborts the extraction ("zip-slip" defense).

pub mod path;

pub use path::validate_path;
