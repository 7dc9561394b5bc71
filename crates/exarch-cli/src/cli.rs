//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exarch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract archive contents into a destination directory
    Extract(ExtractArgs),
    /// List archive member names without extracting
    List(ListArgs),
    /// Validate archive structure and hash it without extracting
    Verify(VerifyArgs),
    /// Generate shell completion scripts
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the TAR archive (optionally gzip/bzip2/xz compressed)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extract only this member, by its archive path
    #[arg(long)]
    pub member: Option<String>,

    /// Maximum number of members the archive may contain
    #[arg(long, default_value = "10000")]
    pub max_files: usize,

    /// Maximum cumulative extracted size, e.g. "5G", "512M"
    #[arg(long, value_parser = parse_byte_size)]
    pub max_total_size: Option<u64>,

    /// Maximum size of a single extracted member, e.g. "1G", "100M"
    #[arg(long, value_parser = parse_byte_size)]
    pub max_file_size: Option<u64>,

    /// Maximum archive-level decompression ratio
    #[arg(long, default_value = "200")]
    pub max_ratio: f64,

    /// Resolve symlinks that stay inside the destination, instead of rejecting them
    #[arg(long)]
    pub allow_symlinks: bool,

    /// Allow hardlinks to already-extracted members, instead of rejecting them
    #[arg(long)]
    pub allow_hardlinks: bool,

    /// Materialise GNU/PAX sparse entries, instead of rejecting them
    #[arg(long)]
    pub allow_sparse: bool,

    /// Preserve the archived uid/gid instead of the current process's
    #[arg(long)]
    pub preserve_ownership: bool,

    /// Also strip group/owner write bits from extracted file modes
    #[arg(long)]
    pub strip_write_bits: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Maximum number of members the archive may contain
    #[arg(long, default_value = "10000")]
    pub max_files: usize,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parses a byte size with an optional K/M/G/T suffix.
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map(|n| n * multiplier)
        .map_err(|_| format!("invalid byte size: {s}"))
}
