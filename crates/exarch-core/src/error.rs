//! Error taxonomy for archive extraction.
//!
//! Every failure mode the pipeline can produce maps onto one of the
//! variants below. The mapping is deliberately coarse — callers branch
//! on `error_code()` (stable, machine-readable) rather than on variant
//! shape, so new trigger conditions can be folded into an existing leaf
//! without breaking downstream matches.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// The single root error type for archive extraction failures.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// A member's resolved path escapes the extraction root, or an
    /// archive-level invariant about path safety was violated.
    ///
    /// Covers path traversal (`../`), absolute paths, symlink/hardlink
    /// escapes, symlink chains that loop or run too deep, hardlink
    /// forward references, PAX path overrides that resolve outside the
    /// base directory, and malformed member names (empty, embedded NUL,
    /// over-length).
    #[error("unsafe entry: {reason}")]
    UnsafeEntry {
        /// Human-readable description of the violation.
        reason: String,
    },

    /// A member's type is not on the allowed whitelist.
    ///
    /// Covers character devices, block devices, FIFOs, rejected sparse
    /// entries, and unrecognised TAR type codes.
    #[error("unsafe entry type: {reason}")]
    UnsafeEntryType {
        /// Human-readable description of the rejected type.
        reason: String,
    },

    /// A single member's decompressed size exceeds `max_file_size`.
    #[error("member exceeds max_file_size ({max} bytes): {size} bytes written")]
    FileSizeExceeded {
        /// Bytes written before the limit was hit.
        size: u64,
        /// The configured limit.
        max: u64,
    },

    /// Cumulative extraction size exceeds `max_total_size`.
    #[error("cumulative extraction exceeds max_total_size ({max} bytes): {current} bytes written")]
    TotalSizeExceeded {
        /// Bytes written so far.
        current: u64,
        /// The configured limit.
        max: u64,
    },

    /// Archive-level decompression ratio exceeds `max_ratio`.
    #[error("archive compression ratio ({ratio:.1}:1) exceeds max_ratio ({max:.1}:1)")]
    CompressionRatioExceeded {
        /// Observed ratio at the point of failure.
        ratio: f64,
        /// The configured limit.
        max: f64,
    },

    /// The archive contains more members than `max_files`.
    #[error("archive contains more than {max} entries ({count} counted)")]
    FileCountExceeded {
        /// Count at the point the scan aborted.
        count: usize,
        /// The configured limit.
        max: usize,
    },

    /// Nested-archive descent depth exceeds `max_nesting_depth`.
    ///
    /// The library never recurses on its own; this variant exists so a
    /// caller implementing recursive descent has a matching error kind.
    #[error("nesting depth ({depth}) exceeds max_nesting_depth ({max})")]
    NestingDepthExceeded {
        /// Depth at which the caller aborted.
        depth: usize,
        /// The configured limit.
        max: usize,
    },

    /// The archive is structurally invalid.
    ///
    /// Covers unreadable headers, truncated streams, decompressor EOF,
    /// and other structural defects surfaced by the TAR reader.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    /// A requested operation is not permitted by this library's contract.
    ///
    /// Covers opening with a write/append mode and passing a `None`
    /// destination directory where one is required.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Returns the stable, machine-readable error code for this variant.
    ///
    /// These codes are also used to derive [`crate::SecurityEvent::event_type`]
    /// values, so they must never embed paths or other archive contents.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsafeEntry { .. } => "UNSAFE_ENTRY",
            Self::UnsafeEntryType { .. } => "UNSAFE_ENTRY_TYPE",
            Self::FileSizeExceeded { .. } => "FILE_SIZE_EXCEEDED",
            Self::TotalSizeExceeded { .. } => "TOTAL_SIZE_EXCEEDED",
            Self::CompressionRatioExceeded { .. } => "COMPRESSION_RATIO_EXCEEDED",
            Self::FileCountExceeded { .. } => "FILE_COUNT_EXCEEDED",
            Self::NestingDepthExceeded { .. } => "NESTING_DEPTH_EXCEEDED",
            Self::MalformedArchive(_) => "MALFORMED_ARCHIVE",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// `true` for the subset of errors that represent a security policy
    /// rejection (as opposed to a type error or plain I/O failure).
    ///
    /// Used by the orchestrator to decide whether to fire a
    /// [`crate::SecurityEvent`].
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::UnsafeEntry { .. }
                | Self::UnsafeEntryType { .. }
                | Self::FileSizeExceeded { .. }
                | Self::TotalSizeExceeded { .. }
                | Self::CompressionRatioExceeded { .. }
                | Self::FileCountExceeded { .. }
                | Self::NestingDepthExceeded { .. }
        )
    }

    pub(crate) fn unsafe_entry(reason: impl Into<String>) -> Self {
        Self::UnsafeEntry {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsafe_entry_type(reason: impl Into<String>) -> Self {
        Self::UnsafeEntryType {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedArchive(reason.into())
    }
}
