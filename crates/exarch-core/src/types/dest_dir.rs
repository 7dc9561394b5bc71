//! Validated destination directory type.

use crate::ExtractionError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A validated destination directory for archive extraction.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem
/// - Be a directory (not a file)
/// - Be writable by the current process
/// - Be represented as an absolute canonical path
///
/// # Security Properties
///
/// Once constructed, a `DestDir` is guaranteed to be a valid, writable
/// directory. All paths are canonicalized to prevent TOCTOU
/// (time-of-check-time-of-use) attacks.
///
/// # Examples
///
/// ```no_run
/// use exarch_core::types::DestDir;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new(PathBuf::from("/tmp/extraction"))?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// # Validation
    ///
    /// This function performs the following checks:
    /// 1. Creates the path (and any missing parents) if it doesn't exist
    /// 2. Verifies the path is a directory
    /// 3. Canonicalizes the path to an absolute path
    /// 4. Checks write permissions (platform-specific)
    ///
    /// # Security Considerations
    ///
    /// **TOCTOU Warning**: This function has a time-of-check-time-of-use
    /// (TOCTOU) race condition between the `exists()`, `is_dir()`, and
    /// `canonicalize()` calls. An attacker with filesystem access could
    /// replace the directory with a symlink between these checks.
    ///
    /// This is partially mitigated by:
    /// - Canonicalizing the path, which resolves symlinks
    /// - Validating all extracted paths against the canonical destination
    ///
    /// Full TOCTOU mitigation would require using `openat()` family of
    /// functions for all subsequent operations, which is platform-specific
    /// and complex.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be created
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    /// - The directory is not writable (on Unix)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use exarch_core::types::DestDir;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dest = DestDir::new(PathBuf::from("/tmp"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        // Create the directory (and any parents) if it doesn't exist yet,
        // mirroring the behaviour callers get from `extractall(base_dir)`.
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| {
                ExtractionError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to create destination directory {}: {}", path.display(), e),
                ))
            })?;
        }

        // Verify it's a directory
        if !path.is_dir() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        // Canonicalize to absolute path
        let canonical = path.canonicalize().map_err(|e| {
            ExtractionError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        // M-CODE-6: Check write permissions using libc::access() (Unix only)
        #[cfg(unix)]
        {
            use std::ffi::CString;
            use std::os::unix::ffi::OsStrExt;

            // Use access() syscall to check effective write permissions
            let path_cstring = CString::new(canonical.as_os_str().as_bytes()).map_err(|_| {
                ExtractionError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path contains null byte",
                ))
            })?;

            // SAFETY: access() is safe to call with a valid C string.
            // The pointer is valid for the duration of the call.
            // access() does not modify the string and returns immediately.
            #[allow(unsafe_code)]
            let result = unsafe { libc::access(path_cstring.as_ptr(), libc::W_OK) };

            if result != 0 {
                return Err(ExtractionError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("directory is not writable: {}", canonical.display()),
                )));
            }
        }

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    ///
    /// This method combines the destination directory with a validated safe
    /// path to produce the final extraction path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use exarch_core::types::DestDir;
    /// use exarch_core::types::SafePath;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dest = DestDir::new(PathBuf::from("/tmp"))?;
    /// let safe = SafePath::resolve("foo/bar.txt", &dest)?;
    ///
    /// let final_path = dest.join(&safe);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Joins a `Path` to this destination directory.
    ///
    /// This is a convenience method for joining arbitrary paths that
    /// have already been validated, such as a resolved symlink chain
    /// target.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use exarch_core::types::DestDir;
    /// use std::path::Path;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dest = DestDir::new(PathBuf::from("/tmp"))?;
    /// let path = Path::new("foo/bar.txt");
    ///
    /// let final_path = dest.join_path(path);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    #[must_use]
    pub fn join_path(&self, path: &Path) -> PathBuf {
        self.0.join(path)
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
