//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use exarch_core::ExtractionReport;
use serde::Serialize;
use std::io;
use std::io::Write;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn output_err<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stderr(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            files_extracted: usize,
            directories_created: usize,
            symlinks_created: usize,
            files_skipped: usize,
            bytes_written: u64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = ExtractionOutput {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            files_skipped: report.files_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("extract", data);
        Self::output(&output)
    }

    fn format_member_list(&self, members: &[String], archive_hash: &str) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput {
            archive_hash: String,
            total_entries: usize,
            entries: Vec<String>,
        }

        let data = ListOutput {
            archive_hash: archive_hash.to_string(),
            total_entries: members.len(),
            entries: members.to_vec(),
        };

        let output = JsonOutput::success("list", data);
        Self::output(&output)
    }

    fn format_verification_result(
        &self,
        archive_hash: &str,
        archive_size: u64,
        member_count: usize,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct VerifyOutput {
            archive_hash: String,
            archive_size: u64,
            member_count: usize,
        }

        let data = VerifyOutput {
            archive_hash: archive_hash.to_string(),
            archive_size,
            member_count,
        };

        let output = JsonOutput::success("verify", data);
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:?}"));
        let _ = Self::output_err(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_formatter_output_structure() {
        #[derive(Serialize)]
        struct TestData {
            value: String,
        }

        let data = TestData {
            value: "test".to_string(),
        };

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"value\""));
        assert!(json.contains("\"test\""));
    }
}
