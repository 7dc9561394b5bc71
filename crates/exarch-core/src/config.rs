//! Security configuration for archive extraction.

use std::sync::Arc;

use crate::events::{HardlinkPolicy, SparsePolicy, SymlinkPolicy};
use crate::SecurityEvent;

/// Callback invoked when a member is rejected by a security policy.
pub type SecurityEventCallback = Arc<dyn Fn(&SecurityEvent) + Send + Sync>;

/// Security configuration controlling how an archive is extracted.
///
/// Every numeric default and policy default mirrors the values a
/// caller gets by constructing a handle with no overrides; the
/// environment-variable loader in [`SecurityConfig::from_env`] starts
/// from the same defaults and only overrides fields whose variable is
/// present and parses cleanly.
///
/// # Examples
///
/// ```
/// use exarch_core::SecurityConfig;
///
/// let config = SecurityConfig::default();
///
/// let custom = SecurityConfig {
///     max_file_size: 100 * 1024 * 1024,
///     max_total_size: 1024 * 1024 * 1024,
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct SecurityConfig {
    /// Maximum decompressed size of a single member, in bytes.
    pub max_file_size: u64,
    /// Maximum cumulative decompressed size across all members, in bytes.
    pub max_total_size: u64,
    /// Maximum number of members the archive may contain.
    pub max_files: usize,
    /// Maximum archive-level decompression ratio (total bytes written ÷
    /// compressed archive size on disk).
    pub max_ratio: f64,
    /// Maximum nesting depth for caller-driven recursive descent into
    /// nested archives. This library never recurses on its own; the
    /// field exists so a caller implementing recursion has somewhere to
    /// read and enforce the limit.
    pub max_nesting_depth: usize,
    /// How symlink entries are handled.
    pub symlink_policy: SymlinkPolicy,
    /// How hardlink entries are handled.
    pub hardlink_policy: HardlinkPolicy,
    /// How GNU sparse file entries are handled.
    pub sparse_policy: SparsePolicy,
    /// Strip setuid, setgid, and sticky bits from extracted file modes.
    pub strip_special_bits: bool,
    /// Additionally strip world/group/owner write bits.
    pub strip_write_bits: bool,
    /// Preserve the archived uid/gid instead of substituting the
    /// current process's effective uid/gid.
    pub preserve_ownership: bool,
    /// Clamp mtimes outside `[0, 2^32 - 1]` to the current wall clock.
    pub clamp_timestamps: bool,
    /// Optional callback fired when a member is rejected.
    pub on_security_event: Option<SecurityEventCallback>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("max_file_size", &self.max_file_size)
            .field("max_total_size", &self.max_total_size)
            .field("max_files", &self.max_files)
            .field("max_ratio", &self.max_ratio)
            .field("max_nesting_depth", &self.max_nesting_depth)
            .field("symlink_policy", &self.symlink_policy)
            .field("hardlink_policy", &self.hardlink_policy)
            .field("sparse_policy", &self.sparse_policy)
            .field("strip_special_bits", &self.strip_special_bits)
            .field("strip_write_bits", &self.strip_write_bits)
            .field("preserve_ownership", &self.preserve_ownership)
            .field("clamp_timestamps", &self.clamp_timestamps)
            .field("on_security_event", &self.on_security_event.is_some())
            .finish()
    }
}

impl Default for SecurityConfig {
    /// Creates a `SecurityConfig` with secure default settings:
    /// `max_file_size` 1 GiB, `max_total_size` 5 GiB, `max_files` 10,000,
    /// `max_ratio` 200:1, `max_nesting_depth` 3, all three policy enums at
    /// their most conservative (`Reject`) variant, special bits stripped,
    /// ownership not preserved, timestamps clamped.
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024 * 1024,
            max_total_size: 5 * 1024 * 1024 * 1024,
            max_files: 10_000,
            max_ratio: 200.0,
            max_nesting_depth: 3,
            symlink_policy: SymlinkPolicy::Reject,
            hardlink_policy: HardlinkPolicy::Reject,
            sparse_policy: SparsePolicy::Reject,
            strip_special_bits: true,
            strip_write_bits: false,
            preserve_ownership: false,
            clamp_timestamps: true,
            on_security_event: None,
        }
    }
}

impl SecurityConfig {
    /// Builds a configuration from `SAFETAR_*` environment variables,
    /// falling back to [`SecurityConfig::default`] field-by-field on
    /// absence or a parse failure.
    ///
    /// Variables are read once, here, at construction time; a dynamic
    /// change to the environment mid-extraction is never observed.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_file_size: env_u64("SAFETAR_MAX_FILE_SIZE", defaults.max_file_size),
            max_total_size: env_u64("SAFETAR_MAX_TOTAL_SIZE", defaults.max_total_size),
            max_files: env_usize("SAFETAR_MAX_FILES", defaults.max_files),
            max_ratio: env_f64("SAFETAR_MAX_RATIO", defaults.max_ratio),
            max_nesting_depth: env_usize("SAFETAR_MAX_NESTING_DEPTH", defaults.max_nesting_depth),
            symlink_policy: env_parsed(
                "SAFETAR_SYMLINK_POLICY",
                defaults.symlink_policy,
                SymlinkPolicy::parse,
            ),
            hardlink_policy: env_parsed(
                "SAFETAR_HARDLINK_POLICY",
                defaults.hardlink_policy,
                HardlinkPolicy::parse,
            ),
            sparse_policy: env_parsed(
                "SAFETAR_SPARSE_POLICY",
                defaults.sparse_policy,
                SparsePolicy::parse,
            ),
            strip_special_bits: env_bool("SAFETAR_STRIP_SPECIAL_BITS", defaults.strip_special_bits),
            strip_write_bits: defaults.strip_write_bits,
            preserve_ownership: env_bool("SAFETAR_PRESERVE_OWNERSHIP", defaults.preserve_ownership),
            clamp_timestamps: env_bool("SAFETAR_CLAMP_TIMESTAMPS", defaults.clamp_timestamps),
            on_security_event: None,
        }
    }

    /// Creates a permissive configuration for trusted archives: symlinks
    /// and hardlinks resolve internally, sparse files materialise, and
    /// the ratio limit is relaxed.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_ratio: 10_000.0,
            symlink_policy: SymlinkPolicy::ResolveInternal,
            hardlink_policy: HardlinkPolicy::Internal,
            sparse_policy: SparsePolicy::Materialise,
            ..Self::default()
        }
    }

    /// Registers a security-event callback, replacing any previous one.
    #[must_use]
    pub fn with_security_event_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SecurityEvent) + Send + Sync + 'static,
    {
        self.on_security_event = Some(Arc::new(callback));
        self
    }
}

fn env_u64(name: &str, fallback: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

fn env_usize(name: &str, fallback: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

fn env_f64(name: &str, fallback: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

fn env_bool(name: &str, fallback: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => !matches!(raw.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off" | ""),
        Err(_) => fallback,
    }
}

fn env_parsed<T>(name: &str, fallback: T, parse: impl Fn(&str) -> T) -> T {
    std::env::var(name).ok().map_or(fallback, |raw| parse(&raw))
}
