//! Per-member header validation, run before any content byte is read.
//!
//! Mirrors the classification order of `_guard.py`: sparse detection
//! first, then entry-type whitelisting, then filename sanity.

use tar::{Archive, Entry, EntryType as TarEntryType};

use crate::config::SecurityConfig;
use crate::events::{HardlinkPolicy, SparsePolicy, SymlinkPolicy};
use crate::{ExtractionError, Result};

/// Maximum permitted length, in bytes, of a member name.
pub const MAX_PATH: usize = 4096;

/// What the orchestrator should do with a classified member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Create the entry now (directories, regular files, internal
    /// hardlinks once their target is verified).
    Extract,
    /// Silently skip the entry (`SymlinkPolicy::Ignore`).
    Skip,
    /// Queue the entry for symlink-chain verification and creation after
    /// all non-deferred writes have completed.
    DeferSymlink,
}

/// Returns `true` if a header describes a GNU or PAX sparse file.
///
/// Checked ahead of every other classification, matching `_is_sparse()`:
/// the reader's own sparse flag, the GNU sparse type byte (`S`), or a PAX
/// `GNU.sparse.major`/`GNU.sparse.size` extension header.
#[must_use]
pub fn is_sparse_entry<R: std::io::Read>(entry: &Entry<'_, R>) -> bool {
    if entry.header().entry_type() == TarEntryType::GNUSparse {
        return true;
    }
    if let Ok(Some(pax)) = entry.pax_extensions() {
        for field in pax {
            let Ok(field) = field else { continue };
            if matches!(field.key(), Ok("GNU.sparse.major" | "GNU.sparse.size")) {
                return true;
            }
        }
    }
    false
}

/// Classifies a member's header into a [`Disposition`], applying the
/// entry-type whitelist and the configured symlink/hardlink/sparse
/// policies. Returns the error the member should be rejected with when
/// no disposition applies.
pub fn classify_entry<R: std::io::Read>(
    entry: &Entry<'_, R>,
    config: &SecurityConfig,
) -> Result<Disposition> {
    if is_sparse_entry(entry) {
        return match config.sparse_policy {
            SparsePolicy::Materialise => Ok(Disposition::Extract),
            SparsePolicy::Reject => Err(ExtractionError::unsafe_entry_type(
                "sparse entries are rejected by policy",
            )),
        };
    }

    match entry.header().entry_type() {
        TarEntryType::Regular | TarEntryType::Continuous => Ok(Disposition::Extract),
        TarEntryType::Directory => Ok(Disposition::Extract),
        TarEntryType::Symlink => match config.symlink_policy {
            SymlinkPolicy::Reject => Err(ExtractionError::unsafe_entry(
                "symlink entries are rejected by policy",
            )),
            SymlinkPolicy::Ignore => Ok(Disposition::Skip),
            SymlinkPolicy::ResolveInternal => Ok(Disposition::DeferSymlink),
        },
        TarEntryType::Link => match config.hardlink_policy {
            HardlinkPolicy::Reject => Err(ExtractionError::unsafe_entry(
                "hardlink entries are rejected by policy",
            )),
            HardlinkPolicy::Internal => Ok(Disposition::Extract),
        },
        other => Err(ExtractionError::unsafe_entry_type(format!(
            "entry type not permitted: {other:?}"
        ))),
    }
}

/// Validates a raw member name for emptiness, embedded whitespace-only
/// content, embedded NUL bytes, and excessive length.
pub fn validate_filename(raw: &str) -> Result<()> {
    if raw.is_empty() || raw.trim().is_empty() {
        return Err(ExtractionError::unsafe_entry("empty or blank member name"));
    }
    if raw.as_bytes().contains(&0) {
        return Err(ExtractionError::unsafe_entry(
            "member name contains a NUL byte",
        ));
    }
    if raw.len() > MAX_PATH {
        return Err(ExtractionError::unsafe_entry(format!(
            "member name exceeds {MAX_PATH} bytes"
        )));
    }
    Ok(())
}

/// Validates a PAX `path` override independently of the name carried in
/// the ustar header — it has its own NUL/length checks because a PAX
/// extension can substitute an otherwise-valid header's name.
pub fn validate_pax_path(path: &str) -> Result<()> {
    validate_filename(path)
}

/// Counts archive members without materialising their headers into a
/// `Vec`, remapping reader errors to [`ExtractionError::MalformedArchive`]
/// and giving a pending [`ExtractionError::FileCountExceeded`] priority
/// over any error produced by the member that pushed the count over the
/// limit.
pub fn pre_scan_file_count<R: std::io::Read>(
    archive: &mut Archive<R>,
    max_files: usize,
) -> Result<usize> {
    let mut count = 0usize;
    let entries = archive
        .entries()
        .map_err(|e| ExtractionError::malformed(e.to_string()))?;

    let mut pending_count_exceeded = false;
    for entry in entries {
        match entry {
            Ok(_) => {
                count += 1;
                if count > max_files {
                    pending_count_exceeded = true;
                    break;
                }
            }
            Err(e) => {
                return Err(ExtractionError::malformed(e.to_string()));
            }
        }
    }

    if pending_count_exceeded {
        return Err(ExtractionError::FileCountExceeded {
            count,
            max: max_files,
        });
    }

    Ok(count)
}
