//! Memory-safe TAR archive extraction library with security validation.
//!
//! `exarch-core` extracts TAR archives (plain, gzip, bzip2, or xz
//! compressed) with built-in protection against path traversal, symlink
//! and hardlink escapes, zip-bomb-style decompression ratios, and
//! oversized or over-numerous members. It never writes an archive — only
//! extracts one.
//!
//! # Examples
//!
//! ```no_run
//! use exarch_core::SecurityConfig;
//! use exarch_core::safe_extract;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SecurityConfig::default();
//! let report = safe_extract("archive.tar.gz", "/output/dir", &config)?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod copy;
pub mod error;
pub mod events;
pub mod formats;
pub mod report;
pub mod security;
pub mod test_utils;
pub mod types;

pub use api::safe_extract;
pub use archive::{Archive, ArchiveBuilder};
pub use config::SecurityConfig;
pub use error::{ExtractionError, Result};
pub use events::{HardlinkPolicy, SecurityEvent, SparsePolicy, SymlinkPolicy};
pub use report::ExtractionReport;
pub use types::{DestDir, SafePath};
