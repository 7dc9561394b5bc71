//! List command implementation.
//!
//! Lists member names via the preflight header scan only — no member
//! content is ever read, let alone written to disk.

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use exarch_core::{Archive, SecurityConfig};

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = add_archive_context(
        Archive::open(&args.archive, SecurityConfig::default()),
        &args.archive,
    )?;
    let members = add_archive_context(archive.member_names(), &args.archive)?;

    formatter.format_member_list(&members, archive.archive_hash())?;

    Ok(())
}
