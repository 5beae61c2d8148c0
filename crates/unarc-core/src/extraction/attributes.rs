//! Restoration of entry metadata on extracted paths.
//!
//! Attributes are applied after the content is written, in a fixed order:
//! permissions, then ownership, then timestamps.

use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;
use tracing::trace;
use tracing::warn;

use crate::ArchiveError;
use crate::ExtractOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::types::Header;

/// Applies the header's mode, ownership and times to `path` as selected by
/// `options`.
///
/// # Errors
///
/// Returns [`ArchiveError::Filesystem`] for the first attribute that could
/// not be applied.
pub(crate) fn restore_attributes(
    path: &Path,
    header: &Header,
    options: &ExtractOptions,
    report: &mut ExtractionReport,
) -> Result<()> {
    if options.preserve_permissions {
        set_permissions(path, header.mode)?;
    }

    if options.preserve_ownership {
        match header.ownership() {
            Some((uid, gid)) => set_ownership(path, uid, gid)?,
            None => {
                warn!(name = %header.name, "archive records no ownership, leaving owner unchanged");
                report.add_warning(format!("ownership not recorded for {}", header.name));
            }
        }
    }

    set_times(path, header.access_time, header.mod_time)
}

/// Sets the permission bits of `path`.
#[cfg(unix)]
pub(crate) fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    trace!(path = %path.display(), mode = format_args!("{mode:o}"), "setting permissions");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| ArchiveError::filesystem("set permissions on", path, e))
}

/// Sets the read-only flag of `path` when the mode grants no write access.
#[cfg(not(unix))]
pub(crate) fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    let metadata =
        std::fs::metadata(path).map_err(|e| ArchiveError::filesystem("inspect", path, e))?;
    let mut permissions = metadata.permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    std::fs::set_permissions(path, permissions)
        .map_err(|e| ArchiveError::filesystem("set permissions on", path, e))
}

/// Changes the owner and group of `path`.
#[cfg(unix)]
pub(crate) fn set_ownership(path: &Path, uid: u32, gid: u32) -> Result<()> {
    trace!(path = %path.display(), uid, gid, "setting ownership");
    std::os::unix::fs::chown(path, Some(uid), Some(gid))
        .map_err(|e| ArchiveError::filesystem("set ownership of", path, e))
}

/// Ownership cannot be expressed as numeric ids on this platform.
#[cfg(not(unix))]
pub(crate) fn set_ownership(path: &Path, uid: u32, gid: u32) -> Result<()> {
    warn!(path = %path.display(), uid, gid, "ownership is not supported on this platform");
    Ok(())
}

/// Sets access and modification times. Times that are `None` are left as
/// they are on disk.
pub(crate) fn set_times(
    path: &Path,
    access_time: Option<SystemTime>,
    mod_time: Option<SystemTime>,
) -> Result<()> {
    let result = match (access_time, mod_time) {
        (Some(atime), Some(mtime)) => filetime::set_file_times(
            path,
            FileTime::from_system_time(atime),
            FileTime::from_system_time(mtime),
        ),
        (Some(atime), None) => filetime::set_file_atime(path, FileTime::from_system_time(atime)),
        (None, Some(mtime)) => filetime::set_file_mtime(path, FileTime::from_system_time(mtime)),
        (None, None) => return Ok(()),
    };

    trace!(path = %path.display(), "set file times");
    result.map_err(|e| ArchiveError::filesystem("set times on", path, e))
}
