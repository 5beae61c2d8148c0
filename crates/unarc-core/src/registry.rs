//! Extension-based driver registry.
//!
//! A [`Registry`] maps normalized extensions (`tar.gz`, `zip`, ...) to the
//! [`Driver`] that opens them. It is built once and only read afterwards;
//! [`Registry::global`] holds the process-wide default with every built-in
//! driver.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::ArchiveError;
use crate::Result;
use crate::formats::Archive;
use crate::formats::Driver;
use crate::formats::TarDriver;
use crate::formats::ZipDriver;

/// Strips one leading `.` from an extension.
///
/// No case folding is applied: `TAR` and `tar` are different extensions.
///
/// # Examples
///
/// ```
/// use unarc_core::registry::normalize_extension;
///
/// assert_eq!(normalize_extension(".tar.gz"), "tar.gz");
/// assert_eq!(normalize_extension("tar.gz"), "tar.gz");
/// assert_eq!(normalize_extension("..tar"), ".tar");
/// ```
#[must_use]
pub fn normalize_extension(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

/// Mapping from extension to driver.
///
/// # Examples
///
/// ```
/// use unarc_core::Registry;
///
/// let registry = Registry::global();
/// assert_eq!(registry.resolve(".tgz").unwrap().name(), "tar");
/// assert_eq!(registry.resolve("zip").unwrap().name(), "zip");
/// assert!(registry.resolve("rar").is_err());
/// ```
pub struct Registry {
    drivers: Vec<Box<dyn Driver>>,
    extensions: BTreeMap<&'static str, usize>,
}

impl Registry {
    /// Creates a registry with no drivers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drivers: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// Creates a registry from a set of drivers.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::DuplicateExtension`] if two drivers claim the
    /// same extension.
    pub fn with_drivers(drivers: impl IntoIterator<Item = Box<dyn Driver>>) -> Result<Self> {
        let mut registry = Self::new();
        for driver in drivers {
            registry.register_boxed(driver)?;
        }
        Ok(registry)
    }

    /// Creates a registry with the built-in tar and zip drivers.
    ///
    /// The built-in extension tables are disjoint, so no conflict check runs.
    #[must_use]
    pub fn with_builtin_drivers() -> Self {
        let drivers: Vec<Box<dyn Driver>> = vec![Box::new(TarDriver), Box::new(ZipDriver)];
        let mut extensions = BTreeMap::new();
        for (index, driver) in drivers.iter().enumerate() {
            for &extension in driver.extensions() {
                extensions.insert(extension, index);
            }
        }
        Self {
            drivers,
            extensions,
        }
    }

    /// Returns the process-wide registry with the built-in drivers.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_builtin_drivers)
    }

    /// Adds a driver under all of its extensions.
    ///
    /// Nothing is registered when any extension is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::DuplicateExtension`] naming the first
    /// contested extension and the driver that owns it.
    pub fn register<D: Driver + 'static>(&mut self, driver: D) -> Result<()> {
        self.register_boxed(Box::new(driver))
    }

    fn register_boxed(&mut self, driver: Box<dyn Driver>) -> Result<()> {
        for &extension in driver.extensions() {
            if let Some(&index) = self.extensions.get(extension) {
                return Err(ArchiveError::DuplicateExtension {
                    extension: extension.to_string(),
                    existing: self.drivers[index].name(),
                });
            }
        }

        let index = self.drivers.len();
        for &extension in driver.extensions() {
            self.extensions.insert(extension, index);
        }
        debug!(
            driver = driver.name(),
            extensions = driver.extensions().len(),
            "registered archive driver"
        );
        self.drivers.push(driver);
        Ok(())
    }

    /// Finds the driver for an extension (leading `.` optional).
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MissingExtension`] for an empty extension and
    /// [`ArchiveError::UnsupportedExtension`] when no driver handles it.
    pub fn resolve(&self, extension: &str) -> Result<&dyn Driver> {
        let extension = normalize_extension(extension);
        if extension.is_empty() {
            return Err(ArchiveError::MissingExtension);
        }

        let index =
            self.extensions
                .get(extension)
                .ok_or_else(|| ArchiveError::UnsupportedExtension {
                    extension: extension.to_string(),
                })?;
        let driver = self.drivers[*index].as_ref();
        debug!(extension, driver = driver.name(), "resolved archive driver");
        Ok(driver)
    }

    /// Resolves the driver for `extension` and opens `reader` with it.
    ///
    /// # Errors
    ///
    /// Returns a resolution error from [`resolve`](Self::resolve) or the
    /// driver's open error.
    pub fn open<R: Read + Send + 'static>(
        &self,
        reader: R,
        extension: &str,
    ) -> Result<Box<dyn Archive>> {
        let driver = self.resolve(extension)?;
        driver.open(Box::new(reader), normalize_extension(extension))
    }

    /// Derives the archive extension of a file name, with a leading `.`.
    ///
    /// The longest registered extension that ends the file name wins
    /// (`app.tar.gz` gives `.tar.gz`, not `.gz`). Otherwise the last
    /// `.segment` is returned, registered or not.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarc_core::Registry;
    ///
    /// let registry = Registry::global();
    /// assert_eq!(registry.extension_of("app.tar.gz").as_deref(), Some(".tar.gz"));
    /// assert_eq!(registry.extension_of("dir/app.zip").as_deref(), Some(".zip"));
    /// assert_eq!(registry.extension_of("notes.unknown").as_deref(), Some(".unknown"));
    /// assert_eq!(registry.extension_of("README"), None);
    /// ```
    #[must_use]
    pub fn extension_of(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = path.as_ref();
        let file_name = path.file_name()?.to_str()?;

        let registered = self
            .extensions
            .keys()
            .copied()
            .filter(|extension| {
                file_name.len() > extension.len() + 1
                    && file_name.ends_with(*extension)
                    && file_name.as_bytes()[file_name.len() - extension.len() - 1] == b'.'
            })
            .max_by_key(|extension| extension.len());
        if let Some(extension) = registered {
            return Some(format!(".{extension}"));
        }

        path.extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| format!(".{extension}"))
    }

    /// Returns every registered extension, sorted.
    #[must_use]
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.extensions.keys().copied().collect()
    }

    /// Returns `true` if a driver handles the extension.
    #[must_use]
    pub fn supports(&self, extension: &str) -> bool {
        self.extensions.contains_key(normalize_extension(extension))
    }
}

impl Default for Registry {
    /// Creates a registry with the built-in drivers.
    fn default() -> Self {
        Self::with_builtin_drivers()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "drivers",
                &self.drivers.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}
