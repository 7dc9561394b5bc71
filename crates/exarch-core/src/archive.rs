//! The `Archive` handle: preflight once, then introspect or extract.

use std::path::{Path, PathBuf};

use crate::formats::tar::{self, Preflight};
use crate::types::DestDir;
use crate::ExtractionReport;
use crate::Result;
use crate::SecurityConfig;

/// An opened, preflighted TAR archive.
///
/// Opening runs the full preflight pass once (hash, size, member count);
/// subsequent calls to [`Archive::member_names`], [`Archive::extract_all`],
/// or [`Archive::extract_member`] reuse that result rather than re-scanning
/// the archive.
#[derive(Debug)]
pub struct Archive {
    preflight: Preflight,
    config: SecurityConfig,
}

impl Archive {
    /// Opens `path`, running the preflight pass under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractionError::Io`] if the file cannot be read,
    /// [`crate::ExtractionError::MalformedArchive`] if its TAR structure
    /// is unreadable, or [`crate::ExtractionError::FileCountExceeded`] if
    /// the member count exceeds `config.max_files`.
    pub fn open<P: AsRef<Path>>(path: P, config: SecurityConfig) -> Result<Self> {
        let preflight = Preflight::run(path.as_ref(), &config)?;
        Ok(Self { preflight, config })
    }

    /// Returns a reference to the security configuration this archive was
    /// opened with.
    #[must_use]
    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// First 16 hex characters of the SHA-256 of the whole compressed
    /// archive.
    #[must_use]
    pub fn archive_hash(&self) -> &str {
        &self.preflight.archive_hash
    }

    /// Number of members counted during the preflight pre-scan.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.preflight.member_count
    }

    /// On-disk (compressed) size of the archive, in bytes.
    #[must_use]
    pub fn archive_size(&self) -> u64 {
        self.preflight.archive_size
    }

    /// Lists the archive's member names without extracting anything.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractionError::MalformedArchive`] if a header
    /// cannot be read.
    pub fn member_names(&self) -> Result<Vec<String>> {
        tar::list_members(&self.preflight)
    }

    /// Extracts every member into `dest`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns the first security or I/O error encountered.
    pub fn extract_all<P: AsRef<Path>>(&self, dest: P) -> Result<ExtractionReport> {
        let dest = DestDir::new(dest.as_ref().to_path_buf())?;
        tar::extract(&self.preflight, &dest, &self.config, None)
    }

    /// Extracts only the member whose raw archive name equals `member`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Archive::extract_all`]. Does not
    /// error if no member matches `member` — the resulting report simply
    /// records zero extracted items.
    pub fn extract_member<P: AsRef<Path>>(
        &self,
        dest: P,
        member: &str,
    ) -> Result<ExtractionReport> {
        let dest = DestDir::new(dest.as_ref().to_path_buf())?;
        tar::extract(&self.preflight, &dest, &self.config, Some(member))
    }
}

/// Fluent builder around [`Archive::extract_all`]/[`Archive::extract_member`]
/// for callers who prefer to assemble extraction options incrementally.
///
/// # Examples
///
/// ```no_run
/// use exarch_core::ArchiveBuilder;
/// use exarch_core::SecurityConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = ArchiveBuilder::new()
///     .archive("archive.tar.gz")
///     .output_dir("/tmp/output")
///     .config(SecurityConfig::permissive())
///     .extract()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    archive_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    member: Option<String>,
    config: Option<SecurityConfig>,
}

impl ArchiveBuilder {
    /// Creates a new `ArchiveBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive file path.
    #[must_use]
    pub fn archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Restricts extraction to a single member by its raw archive name.
    #[must_use]
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.member = Some(name.into());
        self
    }

    /// Sets the security configuration.
    #[must_use]
    pub fn config(mut self, config: SecurityConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Executes the extraction with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractionError::InvalidOperation`] if the archive
    /// path or output directory was never set, or the same errors as
    /// [`Archive::extract_all`]/[`Archive::extract_member`] otherwise.
    pub fn extract(self) -> Result<ExtractionReport> {
        let archive_path = self.archive_path.ok_or_else(|| {
            crate::ExtractionError::InvalidOperation("archive path not set".to_string())
        })?;
        let output_dir = self.output_dir.ok_or_else(|| {
            crate::ExtractionError::InvalidOperation("output directory not set".to_string())
        })?;
        let config = self.config.unwrap_or_default();

        let archive = Archive::open(archive_path, config)?;
        match self.member {
            Some(name) => archive.extract_member(output_dir, &name),
            None => archive.extract_all(output_dir),
        }
    }
}
