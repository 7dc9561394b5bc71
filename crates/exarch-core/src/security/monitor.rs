//! Aggregate size and compression-ratio accounting during extraction.
//!
//! Grounded on `_streamer.py`'s `ExtractionMonitor`: per-member and
//! cumulative byte counts are checked on every chunk, in a fixed order —
//! member size, then total size, then the aggregate decompression ratio.

use crate::config::SecurityConfig;
use crate::{ExtractionError, Result};

/// Tracks bytes written during extraction against the configured quotas.
#[derive(Debug)]
pub struct ExtractionMonitor {
    member_bytes: u64,
    total_bytes: u64,
    archive_size: u64,
    max_file_size: u64,
    max_total_size: u64,
    max_ratio: f64,
}

impl ExtractionMonitor {
    /// Creates a monitor for an archive whose on-disk (compressed) size
    /// is `archive_size` — the denominator of the aggregate ratio check.
    /// `0` disables the ratio check, matching `_check_ratio`'s
    /// `if self._archive_size > 0` guard.
    #[must_use]
    pub fn new(archive_size: u64, config: &SecurityConfig) -> Self {
        Self {
            member_bytes: 0,
            total_bytes: 0,
            archive_size,
            max_file_size: config.max_file_size,
            max_total_size: config.max_total_size,
            max_ratio: config.max_ratio,
        }
    }

    /// Resets the per-member counter at the start of each new entry. The
    /// cumulative total is untouched.
    pub fn reset_member(&mut self) {
        self.member_bytes = 0;
    }

    /// Accounts for `n` newly written bytes, checking member size, then
    /// total size, then the aggregate ratio, in that order.
    ///
    /// # Errors
    ///
    /// Returns the first limit exceeded, as
    /// [`ExtractionError::FileSizeExceeded`],
    /// [`ExtractionError::TotalSizeExceeded`], or
    /// [`ExtractionError::CompressionRatioExceeded`].
    pub fn account(&mut self, n: u64) -> Result<()> {
        self.member_bytes += n;
        self.total_bytes += n;

        if self.member_bytes > self.max_file_size {
            return Err(ExtractionError::FileSizeExceeded {
                size: self.member_bytes,
                max: self.max_file_size,
            });
        }
        if self.total_bytes > self.max_total_size {
            return Err(ExtractionError::TotalSizeExceeded {
                current: self.total_bytes,
                max: self.max_total_size,
            });
        }
        self.check_ratio()
    }

    fn check_ratio(&self) -> Result<()> {
        if self.archive_size == 0 {
            return Ok(());
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.total_bytes as f64 / self.archive_size as f64;
        if ratio > self.max_ratio {
            return Err(ExtractionError::CompressionRatioExceeded {
                ratio,
                max: self.max_ratio,
            });
        }
        Ok(())
    }

    /// Total bytes written across all members so far.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(max_file: u64, max_total: u64, max_ratio: f64) -> SecurityConfig {
        SecurityConfig {
            max_file_size: max_file,
            max_total_size: max_total,
            max_ratio,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_account_within_limits() {
        let config = config_with(1000, 10_000, 200.0);
        let mut monitor = ExtractionMonitor::new(100, &config);
        assert!(monitor.account(500).is_ok());
        assert_eq!(monitor.total_bytes(), 500);
    }

    #[test]
    fn test_account_exceeds_file_size() {
        let config = config_with(100, 10_000, 200.0);
        let mut monitor = ExtractionMonitor::new(100, &config);
        let err = monitor.account(200).unwrap_err();
        assert!(matches!(err, ExtractionError::FileSizeExceeded { .. }));
    }

    #[test]
    fn test_account_exceeds_total_size() {
        let config = config_with(10_000, 100, 200.0);
        let mut monitor = ExtractionMonitor::new(100, &config);
        let err = monitor.account(200).unwrap_err();
        assert!(matches!(err, ExtractionError::TotalSizeExceeded { .. }));
    }

    #[test]
    fn test_account_exceeds_ratio() {
        let config = config_with(10_000, 10_000, 2.0);
        let mut monitor = ExtractionMonitor::new(10, &config);
        let err = monitor.account(100).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::CompressionRatioExceeded { .. }
        ));
    }

    #[test]
    fn test_ratio_disabled_when_archive_size_zero() {
        let config = config_with(10_000, 10_000, 1.0);
        let mut monitor = ExtractionMonitor::new(0, &config);
        assert!(monitor.account(5000).is_ok());
    }

    #[test]
    fn test_reset_member_keeps_total() {
        let config = config_with(100, 10_000, 200.0);
        let mut monitor = ExtractionMonitor::new(100, &config);
        monitor.account(50).unwrap();
        monitor.reset_member();
        assert_eq!(monitor.total_bytes(), 50);
        assert!(monitor.account(50).is_ok());
    }

    #[test]
    fn test_file_size_checked_before_total_and_ratio() {
        let config = config_with(10, 10_000, 200.0);
        let mut monitor = ExtractionMonitor::new(100, &config);
        let err = monitor.account(20).unwrap_err();
        assert!(matches!(err, ExtractionError::FileSizeExceeded { .. }));
    }
}
