//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::Spinner;
use anyhow::Context;
use anyhow::Result;
use exarch_core::events::{HardlinkPolicy, SparsePolicy, SymlinkPolicy};
use exarch_core::{Archive, SecurityConfig};
use std::env;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let defaults = SecurityConfig::default();
    let config = SecurityConfig {
        max_files: args.max_files,
        max_total_size: args.max_total_size.unwrap_or(defaults.max_total_size),
        max_file_size: args.max_file_size.unwrap_or(defaults.max_file_size),
        max_ratio: args.max_ratio,
        symlink_policy: if args.allow_symlinks {
            SymlinkPolicy::ResolveInternal
        } else {
            SymlinkPolicy::Reject
        },
        hardlink_policy: if args.allow_hardlinks {
            HardlinkPolicy::Internal
        } else {
            HardlinkPolicy::Reject
        },
        sparse_policy: if args.allow_sparse {
            SparsePolicy::Materialise
        } else {
            SparsePolicy::Reject
        },
        preserve_ownership: args.preserve_ownership,
        strip_write_bits: args.strip_write_bits,
        ..defaults
    };

    let spinner = Spinner::new("Extracting");
    let archive = add_archive_context(Archive::open(&args.archive, config), &args.archive)?;

    let report = add_archive_context(
        match &args.member {
            Some(member) => archive.extract_member(&output_dir, member),
            None => archive.extract_all(&output_dir),
        },
        &args.archive,
    )?;
    spinner.finish();

    formatter.format_extraction_result(&report)?;

    Ok(())
}
