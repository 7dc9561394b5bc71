//! Error conversion utilities for the CLI.
//!
//! Converts exarch-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use anyhow::Result;
use exarch_core::ExtractionError;
use std::path::Path;

/// Converts an `ExtractionError` into a user-friendly anyhow error with context.
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::UnsafeEntry { reason } => anyhow!(
            "Security violation: archive '{}' contains an unsafe entry: {reason}\n\
             HINT: this archive may be malicious. Do not extract from untrusted sources.",
            archive.display(),
        ),
        ExtractionError::UnsafeEntryType { reason } => anyhow!(
            "Security violation: archive '{}' contains a rejected entry type: {reason}\n\
             HINT: use --allow-symlinks, --allow-hardlinks, or --allow-sparse if the source is trusted.",
            archive.display(),
        ),
        ExtractionError::FileSizeExceeded { size, max } => anyhow!(
            "Extraction limit exceeded for '{}': member size {size} bytes exceeds max {max} bytes\n\
             HINT: use --max-file-size to raise the limit.",
            archive.display(),
        ),
        ExtractionError::TotalSizeExceeded { current, max } => anyhow!(
            "Extraction limit exceeded for '{}': total extracted size {current} bytes exceeds max {max} bytes\n\
             HINT: use --max-total-size to raise the limit.",
            archive.display(),
        ),
        ExtractionError::CompressionRatioExceeded { ratio, max } => anyhow!(
            "Security violation: archive '{}' looks like a decompression bomb ({ratio:.1}:1, max {max:.1}:1)\n\
             HINT: use --max-ratio to raise the limit if the archive is legitimately dense.",
            archive.display(),
        ),
        ExtractionError::FileCountExceeded { count, max } => anyhow!(
            "Extraction limit exceeded for '{}': {count} members exceeds max {max}\n\
             HINT: use --max-files to raise the limit.",
            archive.display(),
        ),
        ExtractionError::NestingDepthExceeded { depth, max } => anyhow!(
            "Extraction limit exceeded for '{}': nesting depth {depth} exceeds max {max}",
            archive.display(),
        ),
        ExtractionError::MalformedArchive(reason) => anyhow!(
            "Invalid archive '{}': {reason}\n\
             HINT: the archive may be corrupted or truncated.",
            archive.display(),
        ),
        ExtractionError::Io(io_err) => anyhow!(
            "I/O error while processing '{}': {io_err}",
            archive.display(),
        ),
        other => anyhow::Error::from(other)
            .context(format!("error processing archive '{}'", archive.display())),
    }
}

/// Adds archive-path context to a result carrying a typed `ExtractionError`.
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}
