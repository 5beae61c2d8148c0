//! Types shared by the format drivers and the extraction engine.
//!
//! [`Header`] is the normalized per-entry metadata every driver produces.
//! [`DestDir`] and [`SafePath`] carry extraction targets: a `SafePath` can
//! only be built by checking an entry name against a `DestDir`.

pub mod dest_dir;
pub mod header;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use header::Header;
pub use header::HeaderType;
pub use safe_path::SafePath;
