//! Options for opening and extracting archives.

/// Options for [`open`](crate::open).
///
/// # Examples
///
/// ```
/// use unarc_core::OpenOptions;
///
/// let options = OpenOptions::new(".tar.gz");
/// assert_eq!(options.extension, ".tar.gz");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Archive extension used to select a driver, with or without a leading
    /// dot (`"tar.gz"` and `".tar.gz"` are equivalent).
    pub extension: String,
}

impl OpenOptions {
    /// Creates options for the given extension.
    #[must_use]
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

/// Options for [`extract`](crate::extract) and
/// [`extract_archive`](crate::extract_archive).
///
/// # Examples
///
/// ```
/// use unarc_core::ExtractOptions;
///
/// // Restore permissions, leave ownership alone
/// let options = ExtractOptions::new("zip");
/// assert!(options.preserve_permissions);
/// assert!(!options.preserve_ownership);
///
/// // Restore everything, e.g. when running as root
/// let options = ExtractOptions::new("tar").with_preserve_ownership(true);
/// assert!(options.preserve_ownership);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Archive extension used to select a driver, with or without a leading
    /// dot.
    pub extension: String,

    /// Apply the entry mode to extracted files and directories.
    pub preserve_permissions: bool,

    /// Apply the entry owner and group. Skipped for entries whose format
    /// records no ownership.
    pub preserve_ownership: bool,
}

impl Default for ExtractOptions {
    /// Creates `ExtractOptions` with no extension.
    ///
    /// Default values:
    /// - `extension`: empty (must be set before extracting)
    /// - `preserve_permissions`: true
    /// - `preserve_ownership`: false
    fn default() -> Self {
        Self {
            extension: String::new(),
            preserve_permissions: true,
            preserve_ownership: false,
        }
    }
}

impl ExtractOptions {
    /// Creates default options for the given extension.
    #[must_use]
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }

    /// Sets whether entry modes are applied.
    #[must_use]
    pub const fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets whether entry ownership is applied.
    #[must_use]
    pub const fn with_preserve_ownership(mut self, preserve: bool) -> Self {
        self.preserve_ownership = preserve;
        self
    }

    /// Returns the matching [`OpenOptions`].
    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions::new(self.extension.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert!(options.extension.is_empty());
        assert!(options.preserve_permissions);
        assert!(!options.preserve_ownership);
    }

    #[test]
    fn test_builders() {
        let options = ExtractOptions::new("tgz")
            .with_preserve_permissions(false)
            .with_preserve_ownership(true);
        assert_eq!(options.extension, "tgz");
        assert!(!options.preserve_permissions);
        assert!(options.preserve_ownership);
    }

    #[test]
    fn test_open_options_from_extract_options() {
        let options = ExtractOptions::new(".zip");
        assert_eq!(options.open_options(), OpenOptions::new(".zip"));
    }
}
