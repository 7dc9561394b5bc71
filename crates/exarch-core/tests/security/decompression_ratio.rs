//! Decompression-bomb integration tests: resource limits enforced during
//! streaming extraction (member size, total size, aggregate compression
//! ratio, file count) rather than trusting archive headers.

use exarch_core::test_utils::TarTestBuilder;
use exarch_core::{Archive, ExtractionError, SecurityConfig};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use tempfile::TempDir;

fn extract_with(data: Vec<u8>, config: SecurityConfig) -> exarch_core::Result<exarch_core::ExtractionReport> {
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");

    let archive = Archive::open(&archive_path, config)?;
    archive.extract_all(&out_dir)
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_compression_ratio_bomb_rejected() {
    let payload = vec![0u8; 10 * 1024 * 1024];
    let tar_data = TarTestBuilder::new().add_file("bomb.bin", &payload).build();
    let gz_data = gzip(&tar_data);

    let config = SecurityConfig {
        max_ratio: 5.0,
        ..SecurityConfig::default()
    };
    let result = extract_with(gz_data, config);
    assert!(matches!(
        result,
        Err(ExtractionError::CompressionRatioExceeded { .. })
    ));
}

#[test]
fn test_single_member_size_limit_enforced() {
    let payload = vec![b'a'; 1024];
    let data = TarTestBuilder::new().add_file("big.bin", &payload).build();

    let config = SecurityConfig {
        max_file_size: 100,
        ..SecurityConfig::default()
    };
    let result = extract_with(data, config);
    assert!(matches!(
        result,
        Err(ExtractionError::FileSizeExceeded { .. })
    ));
}

#[test]
fn test_total_size_limit_enforced_across_members() {
    let data = TarTestBuilder::new()
        .add_file("a.bin", &vec![b'a'; 600])
        .add_file("b.bin", &vec![b'b'; 600])
        .build();

    let config = SecurityConfig {
        max_file_size: 10_000,
        max_total_size: 1000,
        ..SecurityConfig::default()
    };
    let result = extract_with(data, config);
    assert!(matches!(
        result,
        Err(ExtractionError::TotalSizeExceeded { .. })
    ));
}

#[test]
fn test_file_count_limit_enforced_before_extraction_starts() {
    let mut builder = TarTestBuilder::new();
    for i in 0..20 {
        builder = builder.add_file(&format!("f{i}.txt"), b"x");
    }
    let data = builder.build();

    let config = SecurityConfig {
        max_files: 5,
        ..SecurityConfig::default()
    };
    let result = extract_with(data, config);
    assert!(matches!(
        result,
        Err(ExtractionError::FileCountExceeded { .. })
    ));
}

#[test]
fn test_reasonable_archive_extracts_within_limits() {
    let data = TarTestBuilder::new()
        .add_file("small.txt", b"just a normal file")
        .build();
    let result = extract_with(data, SecurityConfig::default());
    assert!(result.is_ok());
}
