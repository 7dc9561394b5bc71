//! Policy enums and the security event record.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::ExtractionError;

/// Controls how symlink entries in the archive are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkPolicy {
    /// Any symlink entry is rejected with [`ExtractionError::UnsafeEntry`].
    #[default]
    Reject,
    /// Symlink entries are silently skipped.
    Ignore,
    /// Symlinks whose entire target chain stays inside the extraction
    /// root are permitted and created as real symlinks. Creation is
    /// deferred until after all regular files and hardlinks to close
    /// the TOCTOU window.
    ResolveInternal,
}

impl SymlinkPolicy {
    /// Parses the `SAFETAR_SYMLINK_POLICY` tag, falling back to
    /// [`SymlinkPolicy::Reject`] on an unrecognised value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "ignore" => Self::Ignore,
            "resolve_internal" => Self::ResolveInternal,
            _ => Self::Reject,
        }
    }
}

/// Controls how hardlink entries in the archive are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HardlinkPolicy {
    /// Any hardlink entry is rejected with [`ExtractionError::UnsafeEntry`].
    #[default]
    Reject,
    /// Hardlinks are permitted only if the target resolves inside the
    /// extraction root and has already been successfully extracted.
    Internal,
}

impl HardlinkPolicy {
    /// Parses the `SAFETAR_HARDLINK_POLICY` tag, falling back to
    /// [`HardlinkPolicy::Reject`] on an unrecognised value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "internal" => Self::Internal,
            _ => Self::Reject,
        }
    }
}

/// Controls how GNU sparse file entries are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SparsePolicy {
    /// Any sparse entry is rejected with [`ExtractionError::UnsafeEntryType`].
    #[default]
    Reject,
    /// Sparse entries are extracted as fully dense (zero-filled) files.
    /// The per-member and total size monitors apply to the
    /// materialised (dense) size.
    Materialise,
}

impl SparsePolicy {
    /// Parses the `SAFETAR_SPARSE_POLICY` tag, falling back to
    /// [`SparsePolicy::Reject`] on an unrecognised value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "materialise" | "materialize" => Self::Materialise,
            _ => Self::Reject,
        }
    }
}

/// Immutable record of a security event detected during extraction.
///
/// Deliberately excludes filenames, paths, and member names so that
/// forwarding an event to a third-party telemetry sink never leaks
/// confidential filesystem information.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityEvent {
    /// Stable type tag, e.g. `"UNSAFE_ENTRY"`. Mirrors
    /// [`ExtractionError::error_code`].
    pub event_type: &'static str,
    /// First 16 hex characters of the SHA-256 of the whole compressed
    /// archive.
    pub archive_hash: String,
    /// Unix timestamp (seconds, fractional) at the moment of detection.
    pub timestamp: f64,
}

impl SecurityEvent {
    /// Builds an event from an error and a precomputed archive hash.
    ///
    /// Returns `None` for errors that are not security violations (plain
    /// I/O failures, malformed archives) — those are not the kind of
    /// signal worth forwarding to a security telemetry sink.
    #[must_use]
    pub fn from_error(error: &ExtractionError, archive_hash: &str) -> Option<Self> {
        if !error.is_security_violation() {
            return None;
        }
        Some(Self {
            event_type: error.error_code(),
            archive_hash: archive_hash.to_string(),
            timestamp: now_unix_secs(),
        })
    }
}

fn now_unix_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
