//! Verify command implementation.
//!
//! Runs preflight only: hashes the archive, sniffs its codec, and
//! pre-scans member headers, catching `MALFORMED_ARCHIVE` and
//! `FILE_COUNT_EXCEEDED` without ever writing to disk.

use crate::cli::VerifyArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use exarch_core::{Archive, SecurityConfig};

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = SecurityConfig {
        max_files: args.max_files,
        ..SecurityConfig::default()
    };

    let archive = add_archive_context(Archive::open(&args.archive, config), &args.archive)?;

    formatter.format_verification_result(
        archive.archive_hash(),
        archive.archive_size(),
        archive.member_count(),
    )?;

    Ok(())
}
