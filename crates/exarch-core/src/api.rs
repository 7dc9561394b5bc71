//! High-level convenience entry point for archive extraction.

use std::path::Path;

use crate::archive::Archive;
use crate::ExtractionReport;
use crate::Result;
use crate::SecurityConfig;

/// Opens `archive_path`, runs preflight, and extracts every member into
/// `output_dir` under `config`.
///
/// This is the single-call convenience wrapper around
/// [`Archive::open`] + [`Archive::extract_all`] for callers who don't
/// need to inspect the archive between those two steps.
///
/// # Errors
///
/// Returns the first security or I/O error encountered opening or
/// extracting the archive.
///
/// # Examples
///
/// ```no_run
/// use exarch_core::SecurityConfig;
/// use exarch_core::safe_extract;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SecurityConfig::default();
/// let report = safe_extract("archive.tar.gz", "/tmp/output", &config)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn safe_extract<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &SecurityConfig,
) -> Result<ExtractionReport> {
    let archive = Archive::open(archive_path, config.clone())?;
    archive.extract_all(output_dir)
}
